use std::error::Error;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;

use crate::problem::Problem;
use crate::solutions::{Solution, SolutionLayout};

#[derive(Serialize)]
struct ReportJSON<'a> {
    problem: String,
    iterations: usize,
    tabu_size: usize,
    solution: SolutionLayout,
    config: &'a Problem,
    elapsed: f64,
}

pub struct Logger {
    _iteration: usize,
    _time_offset: SystemTime,

    _outputs: PathBuf,
    _problem: String,
    _id: String,
    _writer: Option<File>,
}

impl Logger {
    pub fn new(problem_path: &str, outputs: &str, disable_csv: bool) -> Result<Self, Box<dyn Error>> {
        let outputs = PathBuf::from(outputs);
        let problem = if problem_path == "-" {
            String::from("stdin")
        } else {
            Path::new(problem_path)
                .file_stem()
                .and_then(|stem| stem.to_os_string().into_string().ok())
                .unwrap_or_else(|| String::from("problem"))
        };

        let id = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect::<String>();

        let mut writer = if disable_csv {
            None
        } else {
            fs::create_dir_all(&outputs)?;
            Some(File::create(outputs.join(format!("{problem}-{id}.csv")))?)
        };

        if let Some(ref mut writer) = writer {
            let columns = [
                "Iteration",
                "Cost",
                "Working time",
                "Energy violation",
                "Capacity violation",
                "Best cost",
                "Neighborhood",
            ]
            .join(",");
            writeln!(writer, "sep=,\n{columns}")?;
        }

        Ok(Logger {
            _iteration: 0,
            _time_offset: SystemTime::now(),
            _outputs: outputs,
            _problem: problem,
            _id: id,
            _writer: writer,
        })
    }

    /// A logger that writes nothing, for dry runs and tests.
    pub fn disabled() -> Self {
        Self {
            _iteration: 0,
            _time_offset: SystemTime::now(),
            _outputs: PathBuf::new(),
            _problem: String::new(),
            _id: String::new(),
            _writer: None,
        }
    }

    pub fn log(
        &mut self,
        iteration: usize,
        current: &Solution,
        result: &Solution,
        neighborhood: &str,
    ) -> Result<(), io::Error> {
        self._iteration = iteration + 1;
        if let Some(ref mut writer) = self._writer {
            writeln!(
                writer,
                "{},{},{},{},{},{},\"{}\"",
                self._iteration,
                current.cost(),
                current.working_time,
                current.drone_energy_violation,
                current.capacity_violation,
                result.cost(),
                neighborhood,
            )?;
        }

        Ok(())
    }

    pub fn finalize(&self, problem: &Problem, result: &Solution) -> Result<(), Box<dyn Error>> {
        if self._problem.is_empty() {
            return Ok(());
        }

        let elapsed = SystemTime::now()
            .duration_since(self._time_offset)?
            .as_secs_f64();

        fs::create_dir_all(&self._outputs)?;

        let json_path = self._outputs.join(format!("{}-{}.json", self._problem, self._id));
        let mut json = File::create(&json_path)?;
        println!("{}", json_path.display());
        json.write_all(
            serde_json::to_string(&ReportJSON {
                problem: self._problem.clone(),
                iterations: self._iteration,
                tabu_size: problem.tabu_size,
                solution: SolutionLayout::from(result),
                config: problem,
                elapsed,
            })?
            .as_bytes(),
        )?;

        let json_path = self
            ._outputs
            .join(format!("{}-{}-solution.json", self._problem, self._id));
        let mut json = File::create(&json_path)?;
        println!("{}", json_path.display());
        json.write_all(serde_json::to_string(&SolutionLayout::from(result))?.as_bytes())?;

        Ok(())
    }
}
