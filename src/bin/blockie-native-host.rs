//! Chrome Native Messaging Host for Blockie
//!
//! Runs as the native messaging host for the Blockie extension, speaking
//! Chrome's length-prefixed JSON protocol over stdin/stdout.

use blockie_lib::{
    config::{init_logging, HostConfig},
    native_host::NativeHost,
    open_database,
};
use log::{error, info};
use std::io;

fn main() {
    let config = HostConfig::from_env();
    init_logging(&config.log_filter);

    let db_path = match config.resolve_db_path() {
        Ok(path) => path,
        Err(e) => {
            error!("Initialization error: {e}");
            std::process::exit(1);
        }
    };

    let db = match open_database(&db_path) {
        Ok(db) => db,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    info!("Native host started, database at {}", db_path.display());

    let host = NativeHost::new(db);
    let stdin = io::stdin();
    let stdout = io::stdout();

    // EOF is expected when Chrome closes the connection
    if let Err(e) = host.run(&mut stdin.lock(), &mut stdout.lock()) {
        if e.kind() != io::ErrorKind::UnexpectedEof {
            error!("Native host error: {e}");
            std::process::exit(1);
        }
    }
    info!("Connection closed, exiting");
}
