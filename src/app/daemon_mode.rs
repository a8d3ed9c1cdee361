// License: MIT

use std::io;

use chrono::Local;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinError;

use crate::cli::Args;
use crate::config::TrackerConfig;
use crate::core::tracker_msg::TrackerMsg;
use crate::daemon::Daemon;
use crate::services::{
    idle::{self, BoundedSampler},
    store::Store,
    ticker,
    tray::StatusLinePresenter,
};
use crate::{terror, tinfo, twarn};

type AnyError = Box<dyn std::error::Error + Send + Sync>;

pub async fn run(args: Args) -> Result<(), AnyError> {
    crate::log::init(args.verbose);
    tinfo!("Tracker", "activity tracker starting");

    let cfg = TrackerConfig::from_args(&args).map_err(|e| {
        terror!("Tracker", "{e}");
        e
    })?;

    // single-instance + IPC; without a runtime dir we run unlocked and unreachable
    let instance = match crate::ipc::runtime_dir() {
        Ok(_) => Some(crate::app::platform::acquire_single_instance_lock().map_err(|e| {
            eprintln!("{e}");
            io::Error::new(io::ErrorKind::AlreadyExists, e)
        })?),
        Err(e) => {
            twarn!("Tracker", "{e}; IPC and instance lock disabled");
            None
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (tx, rx) = mpsc::channel::<TrackerMsg>(16);

    if let Some(listener) = instance {
        listener.set_nonblocking(true)?;
        let listener = tokio::net::UnixListener::from_std(listener)?;
        crate::ipc::server::spawn_ipc_server(listener, tx.clone());
    }

    let sampler = BoundedSampler::new(idle::detect(), cfg.sensor_timeout);
    let presenter = Box::new(StatusLinePresenter::stdout(cfg.output));

    let mut daemon = Daemon::new(
        Store::new(cfg.data_path.clone()),
        sampler,
        presenter,
        cfg.idle_threshold,
        Local::now(),
    );

    tokio::spawn(ticker::run_ticker(tx, cfg.tick_interval));

    let mut daemon_task = tokio::spawn({
        let shutdown_tx = shutdown_tx.clone();
        async move { daemon.run(rx, shutdown_rx, shutdown_tx).await }
    });

    let res = tokio::select! {
        res = &mut daemon_task => res,

        sig = crate::app::platform::quit_signal() => {
            match sig {
                Ok(name) => {
                    tinfo!("Tracker", "received {}, shutting down", name);
                    let _ = shutdown_tx.send(true);
                }
                Err(e) => twarn!("Tracker", "quit signals unavailable: {e}"),
            }
            daemon_task.await
        }
    };

    crate::app::platform::release_single_instance_lock();
    tinfo!("Tracker", "clean up before exit");

    finish(res)
}

fn finish(res: Result<Result<(), AnyError>, JoinError>) -> Result<(), AnyError> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(join_err) => Err(Box::new(join_err)),
    }
}
