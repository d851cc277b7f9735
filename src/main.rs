use clap::Parser;

use firecalc::api::{Cli, run};

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
