//! Command-line driver (§6, C8): wires dataset/model I/O to the kernel and
//! optimizer layers behind five verbs — `initialize`, `optimize`,
//! `recalculate`, `evaluate`, `write-support`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::dataset::{parse_dataset, parse_prediction_vector};
use crate::errors::{ConfigError, DatasetError, ModelError};
use crate::kernel::{Kernel, KernelEngine, KernelKind};
use crate::model::{ModelArchive, OptimizerState};
use crate::optimizer::perceptron::{PerceptronBiased, PerceptronUnbiased};
use crate::optimizer::sbp::{SbpBiased, SbpUnbiased};
use crate::optimizer::smo::{SmoBiased, SmoUnbiased};
use crate::optimizer::sparsifier::{SparsifierBiased, SparsifierUnbiased};
use crate::optimizer::Optimizer;
use crate::rng::LinearCongruential64;
use crate::support::write_support;
use crate::vector::FeatureVector;

/// Default row-cache capacity when `--cache-capacity` is not given.
const DEFAULT_CACHE_CAPACITY: usize = 64;

/// A kernel support-vector classifier trainer.
#[derive(Debug, Parser)]
#[command(name = "kernel-svm", version, about)]
pub struct Cli {
    /// The verb to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The five driver verbs.
#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab-case")]
pub enum Command {
    /// Builds a fresh model from a training dataset and writes it out.
    Initialize {
        /// Training dataset path.
        #[arg(short = 'f', long)]
        train: PathBuf,
        /// Optional validation dataset path, appended after training rows.
        #[arg(short = 'V', long)]
        validation: Option<PathBuf>,
        /// Output model path.
        #[arg(short = 'o', long)]
        model: PathBuf,
        /// Kernel name: `linear` or `gaussian`.
        #[arg(short = 'k', long)]
        kernel: String,
        /// Kernel hyperparameters (`gaussian` takes one: `gamma`).
        #[arg(short = 'K', long, value_delimiter = ',')]
        kernel_params: Vec<f64>,
        /// Optimizer name: `smo`, `perceptron`, `sbp`, or `sparsifier`.
        #[arg(short = 'a', long)]
        optimizer: String,
        /// Optimizer hyperparameters (`lambda`/`mu`/`nu`, or
        /// `w_squared,eta,epsilon` for `sparsifier`).
        #[arg(short = 'A', long, value_delimiter = ',')]
        optimizer_params: Vec<f64>,
        /// Use the biased (bias-term) variant.
        #[arg(short = 'b', long)]
        biased: bool,
        /// Teacher prediction-vector path, required by `sparsifier`.
        #[arg(short = 'g', long)]
        targets: Option<PathBuf>,
        /// Row-cache capacity.
        #[arg(short = 'c', long, default_value_t = DEFAULT_CACHE_CAPACITY)]
        cache_capacity: usize,
        /// Gzip-compress the written model.
        #[arg(long)]
        gzip: bool,
    },
    /// Runs optimizer iterations against a loaded model and writes it back.
    Optimize {
        /// Model path, read and overwritten.
        #[arg(short = 'o', long)]
        model: PathBuf,
        /// Number of iterations to run.
        #[arg(short = 'i', long)]
        iterations: u64,
        /// PRNG seed.
        #[arg(short = 's', long, default_value_t = 1)]
        seed: u64,
        /// The model on disk is gzip-compressed.
        #[arg(long)]
        gzip: bool,
    },
    /// Recomputes `r` from `α` exactly and writes the model back.
    Recalculate {
        /// Model path, read and overwritten.
        #[arg(short = 'o', long)]
        model: PathBuf,
        /// The model on disk is gzip-compressed.
        #[arg(long)]
        gzip: bool,
    },
    /// Reports validation responses, or scores for an external dataset.
    Evaluate {
        /// Model path.
        #[arg(short = 'o', long)]
        model: PathBuf,
        /// An external dataset to score instead of the baked-in validation
        /// partition.
        #[arg(short = 'v', long)]
        validation: Option<PathBuf>,
        /// The model on disk is gzip-compressed.
        #[arg(long)]
        gzip: bool,
    },
    /// Writes the support set as text.
    WriteSupport {
        /// Model path.
        #[arg(short = 'o', long)]
        model: PathBuf,
        /// Output path; stdout if omitted.
        #[arg(short = 'w', long)]
        out: Option<PathBuf>,
        /// The model on disk is gzip-compressed.
        #[arg(long)]
        gzip: bool,
    },
}

/// Everything that can go wrong running a driver verb.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A configuration/hyperparameter error.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A dataset-parsing error.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// A model-archive error.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Any other I/O failure (opening files, writing stdout).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The eight optimizer variants, unified behind one value so the driver can
/// load, step, and re-save any of them without knowing which at compile
/// time.
enum AnyOptimizer {
    SmoUnbiased(SmoUnbiased),
    SmoBiased(SmoBiased),
    PerceptronUnbiased(PerceptronUnbiased),
    PerceptronBiased(PerceptronBiased),
    SbpUnbiased(SbpUnbiased),
    SbpBiased(SbpBiased),
    SparsifierUnbiased(SparsifierUnbiased),
    SparsifierBiased(SparsifierBiased),
}

/// Delegates `$method` to whichever variant is held, with `self` borrowed
/// the way `$self_pat` names (`&self` or `&mut self`).
macro_rules! delegate {
    ($self_expr:expr, $binding:ident => $body:expr) => {
        match $self_expr {
            AnyOptimizer::SmoUnbiased($binding) => $body,
            AnyOptimizer::SmoBiased($binding) => $body,
            AnyOptimizer::PerceptronUnbiased($binding) => $body,
            AnyOptimizer::PerceptronBiased($binding) => $body,
            AnyOptimizer::SbpUnbiased($binding) => $body,
            AnyOptimizer::SbpBiased($binding) => $body,
            AnyOptimizer::SparsifierUnbiased($binding) => $body,
            AnyOptimizer::SparsifierBiased($binding) => $body,
        }
    };
}

impl AnyOptimizer {
    fn alphas(&self) -> &[f64] {
        delegate!(self, o => o.alphas())
    }

    fn bias(&mut self) -> f64 {
        delegate!(self, o => o.bias())
    }

    fn evaluate(&mut self, x: &FeatureVector) -> f64 {
        delegate!(self, o => o.evaluate(x))
    }

    fn iterate(&mut self, rng: &mut LinearCongruential64) -> f64 {
        delegate!(self, o => o.iterate(rng))
    }

    fn recalculate(&mut self) {
        delegate!(self, o => o.recalculate());
    }

    fn validation_responses(&self) -> Vec<f64> {
        delegate!(self, o => o.validation_responses())
    }

    fn write_support(&mut self) -> Vec<(f64, FeatureVector)> {
        delegate!(self, o => o.write_support())
    }

    /// Rebuilds a boxed optimizer from a decoded archive, restoring `α`,
    /// the iteration counter, and (for SBP) the running accumulators.
    fn from_archive(archive: &ModelArchive) -> Self {
        let kernel = KernelEngine::new(
            archive.kernel_kind(),
            archive.vectors().to_vec(),
            archive.labels().to_vec(),
            archive.training_size(),
            archive.cache_capacity(),
        );
        match archive.optimizer().clone() {
            OptimizerState::SmoUnbiased { lambda } => {
                let mut o = SmoUnbiased::new(kernel, lambda);
                o.restore(archive.alpha().to_vec(), archive.iterations());
                Self::SmoUnbiased(o)
            }
            OptimizerState::SmoBiased { lambda } => {
                let mut o = SmoBiased::new(kernel, lambda);
                o.restore(archive.alpha().to_vec(), archive.iterations());
                Self::SmoBiased(o)
            }
            OptimizerState::PerceptronUnbiased { mu } => {
                let mut o = PerceptronUnbiased::new(kernel, mu);
                o.restore(archive.alpha().to_vec(), archive.iterations());
                Self::PerceptronUnbiased(o)
            }
            OptimizerState::PerceptronBiased { mu } => {
                let mut o = PerceptronBiased::new(kernel, mu);
                o.restore(archive.alpha().to_vec(), archive.iterations());
                Self::PerceptronBiased(o)
            }
            OptimizerState::SbpUnbiased { nu, sum_alpha, sum_r } => {
                let mut o = SbpUnbiased::new(kernel, nu);
                o.restore(archive.alpha().to_vec(), archive.iterations(), sum_alpha, sum_r);
                Self::SbpUnbiased(o)
            }
            OptimizerState::SbpBiased { nu, sum_alpha, sum_r } => {
                let mut o = SbpBiased::new(kernel, nu);
                o.restore(archive.alpha().to_vec(), archive.iterations(), sum_alpha, sum_r);
                Self::SbpBiased(o)
            }
            OptimizerState::SparsifierUnbiased { targets, w_squared, eta, epsilon } => {
                let mut o = SparsifierUnbiased::new(kernel, targets, w_squared, eta, epsilon);
                o.restore(archive.alpha().to_vec(), archive.iterations());
                Self::SparsifierUnbiased(o)
            }
            OptimizerState::SparsifierBiased { targets, w_squared, eta, epsilon } => {
                let mut o = SparsifierBiased::new(kernel, targets, w_squared, eta, epsilon);
                o.restore(archive.alpha().to_vec(), archive.iterations());
                Self::SparsifierBiased(o)
            }
        }
    }

    /// Rewrites `previous`'s saved `α`, iteration counter, and (for SBP)
    /// running accumulators with this optimizer's current values, keeping
    /// every hyperparameter `previous` already carries.
    fn patch_state(&self, previous: OptimizerState) -> OptimizerState {
        match (self, previous) {
            (Self::SmoUnbiased(_), state @ OptimizerState::SmoUnbiased { .. })
            | (Self::SmoBiased(_), state @ OptimizerState::SmoBiased { .. })
            | (Self::PerceptronUnbiased(_), state @ OptimizerState::PerceptronUnbiased { .. })
            | (Self::PerceptronBiased(_), state @ OptimizerState::PerceptronBiased { .. })
            | (Self::SparsifierUnbiased(_), state @ OptimizerState::SparsifierUnbiased { .. })
            | (Self::SparsifierBiased(_), state @ OptimizerState::SparsifierBiased { .. }) => state,
            (Self::SbpUnbiased(o), OptimizerState::SbpUnbiased { nu, .. }) => {
                OptimizerState::SbpUnbiased { nu, sum_alpha: o.sum_alpha_totals(), sum_r: o.sum_r_totals() }
            }
            (Self::SbpBiased(o), OptimizerState::SbpBiased { nu, .. }) => {
                OptimizerState::SbpBiased { nu, sum_alpha: o.sum_alpha_totals(), sum_r: o.sum_r_totals() }
            }
            (_, previous) => previous,
        }
    }

    fn iterations(&self) -> u64 {
        delegate!(self, o => o.iterations())
    }
}

fn open_reader(path: &PathBuf) -> std::io::Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

fn parse_kernel_kind(name: &str, params: &[f64]) -> Result<KernelKind, ConfigError> {
    match name {
        "linear" => {
            if !params.is_empty() {
                return Err(ConfigError::WrongParameterCount {
                    name: "linear",
                    expected: 0,
                    actual: params.len(),
                });
            }
            Ok(KernelKind::Linear)
        }
        "gaussian" => {
            if params.len() != 1 {
                return Err(ConfigError::WrongParameterCount {
                    name: "gaussian",
                    expected: 1,
                    actual: params.len(),
                });
            }
            let gamma = params[0];
            if gamma <= 0.0 {
                return Err(ConfigError::NonPositiveParameter { name: "gamma", value: gamma });
            }
            Ok(KernelKind::Gaussian { gamma })
        }
        other => Err(ConfigError::UnknownKernel(other.to_string())),
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value <= 0.0 {
        return Err(ConfigError::NonPositiveParameter { name, value });
    }
    Ok(value)
}

/// Builds the requested optimizer variant over `kernel` and the
/// [`OptimizerState`] describing it, consuming `params` and (for the
/// sparsifier) `targets` per the parameter-count table in §6.
fn build_optimizer(
    name: &str,
    biased: bool,
    training_size: usize,
    kernel: KernelEngine,
    params: &[f64],
    targets: Option<Vec<f64>>,
) -> Result<(AnyOptimizer, OptimizerState), ConfigError> {
    match name {
        "smo" => {
            let &[lambda] = params else {
                return Err(ConfigError::WrongParameterCount {
                    name: "smo",
                    expected: 1,
                    actual: params.len(),
                });
            };
            let lambda = require_positive("lambda", lambda)?;
            Ok(if biased {
                (AnyOptimizer::SmoBiased(SmoBiased::new(kernel, lambda)), OptimizerState::SmoBiased { lambda })
            } else {
                (
                    AnyOptimizer::SmoUnbiased(SmoUnbiased::new(kernel, lambda)),
                    OptimizerState::SmoUnbiased { lambda },
                )
            })
        }
        "perceptron" => {
            let &[mu] = params else {
                return Err(ConfigError::WrongParameterCount {
                    name: "perceptron",
                    expected: 1,
                    actual: params.len(),
                });
            };
            let mu = require_positive("mu", mu)?;
            Ok(if biased {
                (
                    AnyOptimizer::PerceptronBiased(PerceptronBiased::new(kernel, mu)),
                    OptimizerState::PerceptronBiased { mu },
                )
            } else {
                (
                    AnyOptimizer::PerceptronUnbiased(PerceptronUnbiased::new(kernel, mu)),
                    OptimizerState::PerceptronUnbiased { mu },
                )
            })
        }
        "sbp" => {
            let &[nu] = params else {
                return Err(ConfigError::WrongParameterCount {
                    name: "sbp",
                    expected: 1,
                    actual: params.len(),
                });
            };
            let nu = require_positive("nu", nu)?;
            let zeros = vec![0.0; training_size];
            Ok(if biased {
                (
                    AnyOptimizer::SbpBiased(SbpBiased::new(kernel, nu)),
                    OptimizerState::SbpBiased { nu, sum_alpha: zeros.clone(), sum_r: zeros },
                )
            } else {
                (
                    AnyOptimizer::SbpUnbiased(SbpUnbiased::new(kernel, nu)),
                    OptimizerState::SbpUnbiased { nu, sum_alpha: zeros.clone(), sum_r: zeros },
                )
            })
        }
        "sparsifier" => {
            let &[w_squared, eta, epsilon] = params else {
                return Err(ConfigError::WrongParameterCount {
                    name: "sparsifier",
                    expected: 3,
                    actual: params.len(),
                });
            };
            let w_squared = require_positive("w_squared", w_squared)?;
            let eta = require_positive("eta", eta)?;
            let g = targets.unwrap_or_default();
            if g.len() != kernel.training_size() {
                return Err(ConfigError::TargetPredictionLengthMismatch {
                    expected: kernel.training_size(),
                    actual: g.len(),
                });
            }
            Ok(if biased {
                (
                    AnyOptimizer::SparsifierBiased(SparsifierBiased::new(
                        kernel,
                        g.clone(),
                        w_squared,
                        eta,
                        epsilon,
                    )),
                    OptimizerState::SparsifierBiased { targets: g, w_squared, eta, epsilon },
                )
            } else {
                (
                    AnyOptimizer::SparsifierUnbiased(SparsifierUnbiased::new(
                        kernel,
                        g.clone(),
                        w_squared,
                        eta,
                        epsilon,
                    )),
                    OptimizerState::SparsifierUnbiased { targets: g, w_squared, eta, epsilon },
                )
            })
        }
        other => Err(ConfigError::UnknownOptimizer(other.to_string())),
    }
}

fn write_archive(archive: &ModelArchive, path: &PathBuf, gzip: bool) -> Result<(), ModelError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    if gzip { archive.write_gzip(writer) } else { archive.write(writer) }
}

fn read_archive(path: &PathBuf, gzip: bool) -> Result<ModelArchive, ModelError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    if gzip { ModelArchive::read_gzip(reader) } else { ModelArchive::read(reader) }
}

/// Rewrites `previous`'s optimizer state and `α` to match `optimizer`'s
/// current state, keeping every other field (vectors, labels, sizes).
fn rebuild_archive(previous: &ModelArchive, optimizer: &AnyOptimizer) -> ModelArchive {
    ModelArchive::new(
        previous.kernel_kind(),
        previous.vectors().to_vec(),
        previous.labels().to_vec(),
        previous.training_size(),
        previous.cache_capacity(),
        optimizer.alphas().to_vec(),
        Vec::new(),
        optimizer.iterations(),
        optimizer.patch_state(previous.optimizer().clone()),
    )
}

/// Runs `cli.command`, returning the process exit code (`0` on success,
/// `1` on a reported error).
#[must_use]
pub fn run(cli: Cli) -> i32 {
    match run_inner(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn run_inner(cli: Cli) -> Result<(), DriverError> {
    match cli.command {
        Command::Initialize {
            train,
            validation,
            model,
            kernel,
            kernel_params,
            optimizer,
            optimizer_params,
            biased,
            targets,
            cache_capacity,
            gzip,
        } => {
            let train_set = parse_dataset(open_reader(&train)?)?;
            let training_size = train_set.len();
            let mut vectors = train_set.vectors;
            let mut labels = train_set.labels;
            if let Some(path) = &validation {
                let validation_set = parse_dataset(open_reader(path)?)?;
                vectors.extend(validation_set.vectors);
                labels.extend(validation_set.labels);
            }
            let kernel_kind = parse_kernel_kind(&kernel, &kernel_params)?;
            let target_values = targets
                .as_ref()
                .map(|path| parse_prediction_vector(open_reader(path)?, training_size))
                .transpose()?;
            let kernel_engine = KernelEngine::new(
                kernel_kind,
                vectors.clone(),
                labels.clone(),
                training_size,
                cache_capacity,
            );
            let (built, state) = build_optimizer(
                &optimizer,
                biased,
                training_size,
                kernel_engine,
                &optimizer_params,
                target_values,
            )?;
            let archive = ModelArchive::new(
                kernel_kind,
                vectors,
                labels,
                training_size,
                cache_capacity,
                built.alphas().to_vec(),
                Vec::new(),
                0,
                state,
            );
            write_archive(&archive, &model, gzip)?;
            Ok(())
        }
        Command::Optimize { model, iterations, seed, gzip } => {
            let archive = read_archive(&model, gzip)?;
            let mut optimizer = AnyOptimizer::from_archive(&archive);
            let mut rng = LinearCongruential64::new(seed);
            let mut last_gap = 0.0;
            for _ in 0..iterations {
                last_gap = optimizer.iterate(&mut rng);
            }
            println!("last gap: {last_gap}");
            let updated = rebuild_archive(&archive, &optimizer);
            write_archive(&updated, &model, gzip)?;
            Ok(())
        }
        Command::Recalculate { model, gzip } => {
            let archive = read_archive(&model, gzip)?;
            let mut optimizer = AnyOptimizer::from_archive(&archive);
            optimizer.recalculate();
            let updated = rebuild_archive(&archive, &optimizer);
            write_archive(&updated, &model, gzip)?;
            Ok(())
        }
        Command::Evaluate { model, validation, gzip } => {
            let archive = read_archive(&model, gzip)?;
            let mut optimizer = AnyOptimizer::from_archive(&archive);
            if let Some(path) = validation {
                let dataset = parse_dataset(open_reader(&path)?)?;
                let mut correct = 0usize;
                for (x, label) in dataset.vectors.iter().zip(dataset.labels.iter()) {
                    let score = optimizer.evaluate(x);
                    println!("{score}");
                    if score.signum() == label.signum() {
                        correct += 1;
                    }
                }
                println!("accuracy: {correct}/{}", dataset.len());
            } else {
                for response in optimizer.validation_responses() {
                    println!("{response}");
                }
            }
            Ok(())
        }
        Command::WriteSupport { model, out, gzip } => {
            let archive = read_archive(&model, gzip)?;
            let mut optimizer = AnyOptimizer::from_archive(&archive);
            let bias = optimizer.bias();
            let support = optimizer.write_support();
            match out {
                Some(path) => {
                    let mut writer = BufWriter::new(File::create(path)?);
                    write_support(&mut writer, bias, &support)?;
                }
                None => {
                    let mut writer = std::io::stdout().lock();
                    write_support(&mut writer, bias, &support)?;
                    writer.flush()?;
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_dataset(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn initialize_then_optimize_round_trips_iteration_count() {
        let train = write_dataset(&["1 0:1", "-1 0:-1"]);
        let model = NamedTempFile::new().unwrap();
        let model_path = model.path().to_path_buf();

        run_inner(Cli {
            command: Command::Initialize {
                train: train.path().to_path_buf(),
                validation: None,
                model: model_path.clone(),
                kernel: "linear".to_string(),
                kernel_params: vec![],
                optimizer: "smo".to_string(),
                optimizer_params: vec![1.0],
                biased: false,
                targets: None,
                cache_capacity: 8,
                gzip: false,
            },
        })
        .unwrap();

        run_inner(Cli {
            command: Command::Optimize {
                model: model_path.clone(),
                iterations: 5,
                seed: 1,
                gzip: false,
            },
        })
        .unwrap();

        let archive = ModelArchive::read(std::fs::File::open(&model_path).unwrap()).unwrap();
        assert_eq!(archive.iterations(), 5);

        run_inner(Cli {
            command: Command::Optimize { model: model_path.clone(), iterations: 3, seed: 1, gzip: false },
        })
        .unwrap();

        let archive = ModelArchive::read(std::fs::File::open(&model_path).unwrap()).unwrap();
        assert_eq!(archive.iterations(), 8);
    }

    #[test]
    fn sbp_accumulators_survive_a_save_and_reload_round_trip() {
        let train = write_dataset(&["1 0:1", "-1 0:-1", "1 0:2", "-1 0:-2"]);
        let model = NamedTempFile::new().unwrap();
        let model_path = model.path().to_path_buf();

        run_inner(Cli {
            command: Command::Initialize {
                train: train.path().to_path_buf(),
                validation: None,
                model: model_path.clone(),
                kernel: "linear".to_string(),
                kernel_params: vec![],
                optimizer: "sbp".to_string(),
                optimizer_params: vec![0.5],
                biased: false,
                targets: None,
                cache_capacity: 8,
                gzip: false,
            },
        })
        .unwrap();

        run_inner(Cli {
            command: Command::Optimize { model: model_path.clone(), iterations: 4, seed: 7, gzip: false },
        })
        .unwrap();
        let archive_after_first = ModelArchive::read(std::fs::File::open(&model_path).unwrap()).unwrap();
        let OptimizerState::SbpUnbiased { sum_alpha: totals_after_first, .. } =
            archive_after_first.optimizer().clone()
        else {
            panic!("expected SbpUnbiased state");
        };
        assert!(totals_after_first.iter().any(|&t| t != 0.0), "accumulators never became nonzero");

        run_inner(Cli {
            command: Command::Optimize { model: model_path.clone(), iterations: 4, seed: 7, gzip: false },
        })
        .unwrap();
        let archive_after_second = ModelArchive::read(std::fs::File::open(&model_path).unwrap()).unwrap();
        let OptimizerState::SbpUnbiased { sum_alpha: totals_after_second, .. } =
            archive_after_second.optimizer().clone()
        else {
            panic!("expected SbpUnbiased state");
        };
        assert_ne!(
            totals_after_first, totals_after_second,
            "resuming from a saved archive must keep accumulating, not reset to zero"
        );
    }

    #[test]
    fn gzip_round_trip_preserves_the_archive() {
        let train = write_dataset(&["1 0:1", "-1 0:-1"]);
        let model = NamedTempFile::new().unwrap();
        let model_path = model.path().to_path_buf();

        run_inner(Cli {
            command: Command::Initialize {
                train: train.path().to_path_buf(),
                validation: None,
                model: model_path.clone(),
                kernel: "linear".to_string(),
                kernel_params: vec![],
                optimizer: "perceptron".to_string(),
                optimizer_params: vec![0.1],
                biased: true,
                targets: None,
                cache_capacity: 8,
                gzip: true,
            },
        })
        .unwrap();

        run_inner(Cli {
            command: Command::Recalculate { model: model_path.clone(), gzip: true },
        })
        .unwrap();

        let archive = ModelArchive::read_gzip(std::fs::File::open(&model_path).unwrap()).unwrap();
        assert!(matches!(archive.optimizer(), OptimizerState::PerceptronBiased { .. }));
    }

    #[test]
    fn sparsifier_requires_a_target_vector_matching_training_size() {
        let train = write_dataset(&["1 0:1", "-1 0:-1"]);
        let model = NamedTempFile::new().unwrap();
        let err = run_inner(Cli {
            command: Command::Initialize {
                train: train.path().to_path_buf(),
                validation: None,
                model: model.path().to_path_buf(),
                kernel: "linear".to_string(),
                kernel_params: vec![],
                optimizer: "sparsifier".to_string(),
                optimizer_params: vec![1.0, 0.1, 0.01],
                biased: false,
                targets: None,
                cache_capacity: 8,
                gzip: false,
            },
        })
        .unwrap_err();
        assert!(matches!(
            err,
            DriverError::Config(ConfigError::TargetPredictionLengthMismatch { expected: 2, actual: 0 })
        ));
    }
}
