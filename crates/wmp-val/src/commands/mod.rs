pub mod summarize;
pub mod validate;

use chrono::Local;

/// Wall-clock stamp in the classic `ctime` layout.
pub fn ctime() -> String {
    Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}
