use clap::Parser;
use log::error;
use viagen::{generate, Args, Outcome};

pub fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match generate(&args) {
        Ok(Outcome::Printed(artifact)) => print!("{}", artifact.contents()),
        Ok(_) => {}
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}
