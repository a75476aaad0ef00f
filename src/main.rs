extern crate acm;
extern crate clap;
extern crate env_logger;
extern crate log;

use std::io::{self, Write};
use std::process;
use acm::conf;
use acm::error::{Error, Result};
use acm::guards::require_nonnegint;
use acm::job::Job;
use acm::spherical::show_lambda_fun;

fn parse_f64(name: &str, s: &str) -> Result<f64> {
    s.trim().parse().map_err(|_| Error::Type {
        name: name.to_owned(),
        value: s.to_owned(),
    })
}

/// Routes `log` records to stderr; `RUST_LOG` overrides the default level.
fn init_logger() {
    let env = env_logger::Env::default().default_filter_or("warn");
    // a second call in the same process keeps the first logger
    let _ = env_logger::Builder::from_env(env).try_init();
}

fn run(matches: &clap::ArgMatches) -> Result<()> {
    if let Some(path) = matches.value_of("conf") {
        conf::replace(conf::Conf::load_yaml(path)?)?;
    }
    if let Some(b) = matches.value_of("basis-type") {
        conf::set_basis_type(parse_f64("basis_type", b)?)?;
    }

    if let Some(v_max) = matches.value_of("show-lambda-fun") {
        let v_max = require_nonnegint("v_max", parse_f64("v_max", v_max)?)?;
        let basis_type = conf::basis_type();
        println!("basis_type: {}", basis_type.code());
        println!("lambda_fun: {:?}", show_lambda_fun(basis_type, v_max)?);
    }

    if let Some(path) = matches.value_of("job") {
        let job = Job::load_yaml(path)?;
        let conf = job.conf();
        println!("job: {}", path);
        println!("hamiltonian: {:?}", job.hamiltonian);
        println!("a: {}", job.a);
        println!("lambda: {}", job.lambda);
        println!("basis_type: {}", conf.basis_type.code());
        let t = &job.truncation;
        println!("nu: [{}, {}]", t.nu_min, t.nu_max);
        println!("v: [{}, {}]", t.v_min, t.v_max);
        println!("L: [{}, {}]", t.l_min, t.l_max);
        let stdout = io::stdout();
        let mut sink = stdout.lock();
        job.run(&mut sink)?;
        sink.flush().map_err(|err| Error::Io { path: "<stdout>".into(), err })?;
    }
    Ok(())
}

fn main() {
    init_logger();
    let matches = clap::App::new(env!("CARGO_PKG_NAME"))
        .args_from_usage("[--job=<job>] 'YAML job file: Hamiltonian, a, lambda and truncation'")
        .args_from_usage("[--show-lambda-fun=<v_max>] 'Print the radial basis shift of each seniority up to v_max'")
        .args_from_usage("[--conf=<conf>] 'YAML configuration loaded into the registers first'")
        .args_from_usage("[--basis-type=<basis-type>] 'Override the basis type (0, 1, 2 or 3)'")
        .group(clap::ArgGroup::with_name("action")
               .args(&["job", "show-lambda-fun"])
               .multiple(true)
               .required(true))
        .get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_shows_warnings() {
        init_logger();
        init_logger();
        if ::std::env::var_os("RUST_LOG").is_none() {
            assert!(log::log_enabled!(log::Level::Warn));
            assert!(!log::log_enabled!(log::Level::Info));
        }
    }
}
