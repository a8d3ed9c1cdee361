// License: MIT

use crate::cli::{Args, Command};
use crate::core::info::InfoSnapshot;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

pub async fn run(args: Args) -> Result<(), AnyError> {
    let Some(cmd) = args.command.as_ref() else {
        return Ok(());
    };

    match cmd {
        Command::Info { json } => {
            let msg = if *json { "info --json" } else { "info" };

            match crate::ipc::client::send_raw(msg).await {
                Ok(resp) => {
                    if !resp.is_empty() {
                        println!("{resp}");
                    }
                }
                Err(e) => {
                    if *json {
                        println!("{}", InfoSnapshot::not_running_json());
                    } else {
                        eprintln!("activity-tracker: {e}");
                    }
                }
            }
        }

        Command::Stop => match crate::ipc::client::send_raw("stop").await {
            Ok(resp) => {
                let out = resp.trim_end();
                if out.is_empty() {
                    println!("Stopping activity tracker");
                } else {
                    println!("{out}");
                }
            }
            Err(e) => eprintln!("activity-tracker: {e}"),
        },
    }

    Ok(())
}
