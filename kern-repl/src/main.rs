mod error;

use clap::Parser;
use error::Error;
use kern_core::{
    normalize::{DEFAULT_FAN_OUT_THRESHOLD, DEFAULT_MAX_REWRITES},
    NormalizeConfig,
    NormalizeConfigBuilder,
    Normalizer,
    RuleDatabase,
};
use kern_parser::parse;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{
    fs,
    io::{self, IsTerminal, Read, Write},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};
use tracing_subscriber::EnvFilter;

/// Simplify expressions with the kern rewriting kernel.
///
/// Without a file, and with a terminal on stdin, an interactive session is started. Otherwise each
/// non-empty line of the input is simplified in turn.
#[derive(Parser, Debug)]
#[command(name = "kern", version)]
struct Args {
    /// Stop simplifying an input after this many rule firings.
    #[arg(long, default_value_t = DEFAULT_MAX_REWRITES)]
    max_rewrites: usize,

    /// Stop simplifying an input after this many milliseconds.
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Simplify the arguments of a call in parallel if it has at least this many.
    #[arg(long, default_value_t = DEFAULT_FAN_OUT_THRESHOLD)]
    fan_out: usize,

    /// Number of worker threads; 0 picks a number from the available parallelism.
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// File to read inputs from, one per line.
    file: Option<PathBuf>,
}

impl Args {
    /// Returns the normalizer options selected by the flags.
    fn config(&self) -> NormalizeConfig {
        NormalizeConfigBuilder::new()
            .max_rewrites(self.max_rewrites)
            .time_limit(self.time_limit_ms.map(Duration::from_millis))
            .fan_out_threshold(self.fan_out)
            .workers(self.workers)
            .build()
    }
}

/// A numbered sequence of inputs and results.
struct Session<'db> {
    normalizer: Normalizer<'db>,

    /// The number of inputs evaluated so far.
    count: usize,
}

impl<'db> Session<'db> {
    fn new(normalizer: Normalizer<'db>) -> Self {
        Self { normalizer, count: 0 }
    }

    /// The prompt for the next input.
    fn prompt(&self) -> String {
        format!("In[{}] := ", self.count + 1)
    }

    /// Parses and simplifies one input, writing the result to `out`.
    ///
    /// A syntax error is reported to `err`, and does not end the session.
    fn eval(&mut self, input: &str, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
        self.count += 1;
        match parse(input) {
            Ok(expr) => {
                let result = self.normalizer.normalize(&expr);
                writeln!(out, "Out[{}] = {}", self.count, result.expr)?;
                if !result.is_complete() {
                    writeln!(out, "note: {}", result.status)?;
                }
                Ok(())
            },
            Err(parse_err) => parse_err.write_report("input", input, err),
        }
    }

    /// Evaluates each non-empty line of the input, echoing it after the prompt.
    fn run_batch(&mut self, input: &str, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
        for line in input.lines().map(str::trim).filter(|line| !line.is_empty()) {
            writeln!(out, "{}{}", self.prompt(), line)?;
            self.eval(line, out, err)?;
        }
        Ok(())
    }

    /// Reads inputs from the terminal until end of input or an interrupt.
    fn run_interactive(&mut self) -> Result<(), Error> {
        let mut rl = DefaultEditor::new()?;

        loop {
            let input = match rl.readline(&self.prompt()) {
                Ok(input) => input,
                Err(ReadlineError::Eof | ReadlineError::Interrupted) => return Ok(()),
                Err(err) => return Err(err.into()),
            };
            if input.trim().is_empty() {
                continue;
            }

            rl.add_history_entry(&input)?;
            self.eval(&input, &mut io::stdout().lock(), &mut io::stderr().lock())?;
        }
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let db = RuleDatabase::with_builtins()?;
    let config = args.config();
    tracing::debug!(?config, rules = db.len(), "starting session");
    let mut session = Session::new(Normalizer::with_config(&db, config));

    let input = if let Some(path) = &args.file {
        // evaluate a source file
        fs::read_to_string(path)?
    } else if !io::stdin().is_terminal() {
        // evaluate piped input
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        input
    } else {
        return session.run_interactive();
    };

    session.run_batch(&input, &mut io::stdout().lock(), &mut io::stderr().lock())?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    /// Runs the input through a fresh session, returning what was written to stdout and stderr.
    fn transcript(config: NormalizeConfig, input: &str) -> (String, String) {
        let db = RuleDatabase::with_builtins().unwrap();
        let mut session = Session::new(Normalizer::with_config(&db, config));
        let (mut out, mut err) = (Vec::new(), Vec::new());
        session.run_batch(input, &mut out, &mut err).unwrap();

        let err = strip_ansi_escapes::strip(err);
        (String::from_utf8(out).unwrap(), String::from_utf8_lossy(&err).into_owned())
    }

    #[test]
    fn numbered_transcript() {
        let (out, err) = transcript(NormalizeConfig::default(), "2 + 2\n\n  Sin[2 Pi]\n1 x\n0 / 0\n");
        assert_eq!(out, [
            "In[1] := 2 + 2",
            "Out[1] = 4",
            "In[2] := Sin[2 Pi]",
            "Out[2] = 0",
            "In[3] := 1 x",
            "Out[3] = x",
            "In[4] := 0 / 0",
            "Out[4] = Indeterminate",
            "",
        ].join("\n"));
        assert_eq!(err, "");
    }

    #[test]
    fn syntax_errors_are_reported() {
        let (out, err) = transcript(NormalizeConfig::default(), "f[x\nx + x\n");
        assert_eq!(out, "In[1] := f[x\nIn[2] := x + x\nOut[2] = Times[2, x]\n");
        assert!(err.contains("unclosed bracket"), "{}", err);
    }

    #[test]
    fn limits_are_noted() {
        let config = NormalizeConfigBuilder::new().max_rewrites(1).build();
        let (out, _) = transcript(config, "2 x / x + Sin[Pi / 2]");
        assert!(out.contains("note: stopped after 1 rewrites"), "{}", out);
    }

    #[test]
    fn flags() {
        let args = Args::parse_from(["kern", "--max-rewrites", "10", "--time-limit-ms", "250", "--workers", "2", "in.txt"]);
        let config = args.config();
        assert_eq!(config.max_rewrites, 10);
        assert_eq!(config.time_limit, Some(Duration::from_millis(250)));
        assert_eq!(config.fan_out_threshold, DEFAULT_FAN_OUT_THRESHOLD);
        assert_eq!(config.workers, 2);
        assert_eq!(args.file, Some(PathBuf::from("in.txt")));
    }
}
