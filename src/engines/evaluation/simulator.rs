use crate::config::SimulatorConfig;
use crate::engines::evaluation::metric::parse_roi_mpki;
use crate::engines::evaluation::oracle::Oracle;
use crate::error::{Result, TunerError};
use crate::types::{Configuration, InstructionBudget, Trace, TrialFailure, TrialOutcome};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Oracle backed by the external predictor simulator binary
///
/// Every invocation writes its own config artifact and captures its own combined
/// stdout/stderr in the work directory, so concurrent trials never share files.
pub struct SimulatorOracle {
    executable: PathBuf,
    template: Map<String, Value>,
    work_dir: PathBuf,
    timeout: Duration,
    keep_artifacts: bool,
    next_invocation: AtomicU64,
}

impl SimulatorOracle {
    pub fn new(
        executable: impl Into<PathBuf>,
        base_config: Option<&Path>,
        work_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Result<Self> {
        let work_dir = work_dir.into();
        fs::create_dir_all(&work_dir).map_err(|e| {
            TunerError::Oracle(format!(
                "Failed to create work directory {}: {}",
                work_dir.display(),
                e
            ))
        })?;

        let template = match base_config {
            Some(path) => load_template(path)?,
            None => Map::new(),
        };

        Ok(Self {
            executable: executable.into(),
            template,
            work_dir,
            timeout,
            keep_artifacts: false,
            next_invocation: AtomicU64::new(0),
        })
    }

    pub fn from_config(config: &SimulatorConfig) -> Result<Self> {
        let oracle = Self::new(
            &config.executable,
            config.base_config.as_deref(),
            &config.work_dir,
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(oracle.with_keep_artifacts(config.keep_artifacts))
    }

    pub fn with_keep_artifacts(mut self, keep: bool) -> Self {
        self.keep_artifacts = keep;
        self
    }

    /// Template values overlaid with every configuration entry
    pub fn render_artifact(&self, config: &Configuration) -> Value {
        let mut object = self.template.clone();
        for (name, value) in config.iter() {
            object.insert(name.to_string(), Value::from(value));
        }
        Value::Object(object)
    }

    fn write_artifact(&self, path: &Path, config: &Configuration) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.render_artifact(config))?;
        fs::write(path, contents).map_err(|e| {
            TunerError::Oracle(format!(
                "Failed to write config artifact {}: {}",
                path.display(),
                e
            ))
        })
    }

    fn invoke(
        &self,
        artifact: &Path,
        output: &Path,
        trace: &Trace,
        budget: InstructionBudget,
    ) -> Result<TrialOutcome> {
        let capture = File::create(output).map_err(|e| {
            TunerError::Oracle(format!(
                "Failed to create output capture {}: {}",
                output.display(),
                e
            ))
        })?;
        let capture_err = capture.try_clone()?;

        let spawned = Command::new(&self.executable)
            .arg("-c")
            .arg(artifact)
            .arg("-w")
            .arg(budget.warmup.to_string())
            .arg("-n")
            .arg(budget.simulation.to_string())
            .arg(trace.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::from(capture))
            .stderr(Stdio::from(capture_err))
            .spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(e) => {
                return Ok(TrialOutcome::Failed(TrialFailure::Spawn(format!(
                    "{}: {}",
                    self.executable.display(),
                    e
                ))))
            }
        };

        if let Some(failure) = self.wait_with_timeout(child) {
            return Ok(TrialOutcome::Failed(failure));
        }

        let bytes = fs::read(output)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(match parse_roi_mpki(&text) {
            Ok(mpki) => TrialOutcome::Metric(mpki),
            Err(failure) => TrialOutcome::Failed(failure),
        })
    }

    /// Blocks until the child exits; `Some` when it had to be abandoned
    fn wait_with_timeout(&self, mut child: Child) -> Option<TrialFailure> {
        let started = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(_status)) => return None,
                Ok(None) if started.elapsed() >= self.timeout => {
                    abandon(&mut child);
                    return Some(TrialFailure::Timeout);
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    abandon(&mut child);
                    return Some(TrialFailure::Spawn(e.to_string()));
                }
            }
        }
    }
}

impl Oracle for SimulatorOracle {
    fn run(
        &self,
        config: &Configuration,
        trace: &Trace,
        budget: InstructionBudget,
    ) -> Result<TrialOutcome> {
        let invocation = self.next_invocation.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        let artifact = self.work_dir.join(format!("config-{}-{}.json", pid, invocation));
        let output = self.work_dir.join(format!("output-{}-{}.log", pid, invocation));

        // The artifact must be complete before the simulator starts
        self.write_artifact(&artifact, config)?;
        let outcome = self.invoke(&artifact, &output, trace, budget);

        if !self.keep_artifacts {
            let _ = fs::remove_file(&artifact);
            let _ = fs::remove_file(&output);
        }

        outcome
    }
}

/// Kill and reap, so no zombie is left behind
fn abandon(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn load_template(path: &Path) -> Result<Map<String, Value>> {
    let contents = fs::read_to_string(path).map_err(|e| {
        TunerError::Oracle(format!(
            "Failed to read base config {}: {}",
            path.display(),
            e
        ))
    })?;
    match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => Ok(map),
        _ => Err(TunerError::Oracle(format!(
            "Base config {} is not a JSON object",
            path.display()
        ))),
    }
}
