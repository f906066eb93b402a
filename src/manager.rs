use crate::analysis::{Analyzer, save_results};
use crate::config::Config;
use crate::evaluation::{Evaluation, ModelKind, evaluate};
use anyhow::{Context, Result, bail};
use glob::glob;
use rmp_serde::encode;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    /// Evaluate every configured model, or only `model`, and save the results.
    ///
    /// Models whose evaluation ends with a warning are logged and skipped,
    /// leaving any previous trajectory file untouched.
    pub fn run_models(&self, model: Option<ModelKind>) -> Result<()> {
        let reqs = match model {
            Some(kind) => match self.cfg.request(kind) {
                Some(req) => vec![req],
                None => bail!("model {kind} is not configured"),
            },
            None => self.cfg.requests(),
        };

        for req in reqs {
            let kind = req.params.kind();
            let eval = evaluate(&req);
            if !eval.is_success() {
                log::warn!("{kind}: {}", eval.status);
                continue;
            }
            log::info!("{kind}: {}", eval.status);

            let file = self.trajectory_file(kind);
            save_evaluation(&eval, &file)
                .with_context(|| format!("failed to save {kind} evaluation"))?;
            log::info!("saved {file:?}");
        }

        Ok(())
    }

    /// Summarize every trajectory file into the results file.
    pub fn analyze_results(&self) -> Result<()> {
        let files = self
            .trajectory_files()
            .context("failed to collect trajectory files")?;
        if files.is_empty() {
            bail!("no trajectory files in {:?}", self.sim_dir);
        }

        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            let mut analyzer = Analyzer::from_file(&file)
                .with_context(|| format!("failed to load {file:?}"))?;
            let report = analyzer
                .analyze()
                .with_context(|| format!("failed to analyze {file:?}"))?;
            reports.push(report);
        }

        let results_file = self.results_file();
        save_results(&reports, &results_file).context("failed to save results")?;
        log::info!("saved {results_file:?}");

        Ok(())
    }

    /// Remove trajectory and results files.
    pub fn clean_outputs(&self) -> Result<()> {
        let mut files = self
            .trajectory_files()
            .context("failed to collect trajectory files")?;
        let results_file = self.results_file();
        if results_file.is_file() {
            files.push(results_file);
        }

        for file in files {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            log::info!("removed {file:?}");
        }

        Ok(())
    }

    fn trajectory_files(&self) -> Result<Vec<PathBuf>> {
        let pattern = self.sim_dir.join("trajectory-*.msgpack");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let mut files: Vec<_> = glob(pattern)
            .context("failed to glob trajectory files")?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    fn trajectory_file(&self, kind: ModelKind) -> PathBuf {
        self.sim_dir.join(format!("trajectory-{kind}.msgpack"))
    }

    fn results_file(&self) -> PathBuf {
        self.sim_dir.join("results.json")
    }
}

fn save_evaluation(eval: &Evaluation, file: &Path) -> Result<()> {
    let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let mut writer = BufWriter::new(file);
    encode::write(&mut writer, eval).context("failed to serialize evaluation")?;
    writer.flush().context("failed to flush writer stream")?;
    Ok(())
}
