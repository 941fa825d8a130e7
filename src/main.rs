use std::fs;
use std::io::Read;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use colored::Colorize;
use mimalloc::MiMalloc;
use rand::prelude::*;
use rand::rngs::StdRng;

mod cli;
mod clusterize;
mod config;
mod errors;
mod initial;
mod logger;
mod neighborhoods;
mod problem;
mod progress;
mod routes;
mod solutions;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn read_input(path: &str) -> String {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer).unwrap();
        buffer
    } else {
        fs::read_to_string(path).unwrap()
    }
}

fn parse_problem(path: &str) -> Result<Rc<problem::Problem>, ExitCode> {
    match problem::Problem::parse(&read_input(path)) {
        Ok(parsed) => Ok(Rc::new(parsed)),
        Err(error) => {
            eprintln!("{}", error.to_string().red());
            Err(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    match cli::Arguments::parse().command {
        cli::Commands::Run {
            problem,
            seed,
            outputs,
            disable_logging,
        } => {
            let parsed = match parse_problem(&problem) {
                Ok(parsed) => parsed,
                Err(code) => return code,
            };

            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };

            let mut logger = logger::Logger::new(&problem, &outputs, disable_logging).unwrap();
            let mut sink: Box<dyn progress::ProgressSink> = if parsed.verbose {
                Box::new(progress::ConsoleProgress)
            } else {
                Box::new(progress::NoProgress)
            };

            let solution =
                solutions::Solution::tabu_search(&parsed, &mut rng, sink.as_mut(), &mut logger);
            logger.finalize(&parsed, &solution).unwrap();

            eprintln!("{}", format!("Result = {}", solution.working_time).red());
            solution.verify().unwrap();
            ExitCode::SUCCESS
        }

        cli::Commands::Evaluate { solution, problem } => {
            let parsed = match parse_problem(&problem) {
                Ok(parsed) => parsed,
                Err(code) => return code,
            };

            let data = fs::read_to_string(solution).unwrap();
            let layout = serde_json::from_str::<solutions::SolutionLayout>(&data).unwrap();
            let evaluated = solutions::Solution::from_layout(&parsed, &layout);

            println!(
                "{}",
                serde_json::to_string(&solutions::SolutionLayout::from(&evaluated)).unwrap()
            );
            eprintln!("{}", format!("Result = {}", evaluated.working_time).red());
            evaluated.verify().unwrap();
            ExitCode::SUCCESS
        }
    }
}
