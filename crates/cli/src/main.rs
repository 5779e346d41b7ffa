use std::process::ExitCode;

fn main() -> ExitCode {
    sitestock_cli::run()
}
