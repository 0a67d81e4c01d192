mod cli;
mod commands;

use cli::CompileParams;

fn main() {
    let matches = cli::build_cli().get_matches();
    let params = CompileParams::from_matches(&matches);
    std::process::exit(commands::compile::run(params));
}
