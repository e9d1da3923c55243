use rtib_directory::{init_tracing, open_directory};
use std::path::PathBuf;
use std::process::ExitCode;

/// Bootstrap tool: grants admin rights to an existing account by email.
/// The account must have signed in at least once so its user document exists.
fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let mut email: Option<String> = None;
    let mut data_dir = PathBuf::from("data");

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => match args.next() {
                Some(value) => data_dir = PathBuf::from(value),
                None => {
                    eprintln!("--data-dir requires a path");
                    return ExitCode::FAILURE;
                }
            },
            "--help" | "-h" => {
                eprintln!("Usage: make-admin [--data-dir <path>] <email>");
                return ExitCode::SUCCESS;
            }
            other => email = Some(other.to_string()),
        }
    }

    let Some(email) = email else {
        eprintln!("Usage: make-admin [--data-dir <path>] <email>");
        return ExitCode::FAILURE;
    };

    if let Err(error) = init_tracing(&data_dir) {
        eprintln!("Failed to initialize logging: {}", error);
        return ExitCode::FAILURE;
    }

    let service = match open_directory(&data_dir) {
        Ok(service) => service,
        Err(error) => {
            eprintln!("Failed to open directory data: {}", error);
            return ExitCode::FAILURE;
        }
    };

    match service.make_admin(&email) {
        Ok(user) => {
            println!("{} is now an administrator", user.email);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}
