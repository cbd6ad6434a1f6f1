use registrar::cli::{build_cli, handlers};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let code = match handlers::run(&matches).await {
        Ok(code) => code,
        Err(err) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error: {err:#}");
            }
            1
        }
    };

    #[allow(clippy::exit)]
    std::process::exit(code);
}
