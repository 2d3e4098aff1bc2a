use std::process;

fn main() {
    paisapal_core::init();

    if let Err(err) = paisapal_core::cli::run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
