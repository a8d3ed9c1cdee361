// License: MIT

pub mod info;
pub mod stop;
