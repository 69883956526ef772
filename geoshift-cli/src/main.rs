//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = geoshift_cli::run() {
        eprintln!("geoshift: {err}");
        std::process::exit(1);
    }
}
