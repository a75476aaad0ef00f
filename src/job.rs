//! Job files: a Hamiltonian, its basis parameters and a truncation.
use std::fs;
use std::io::Write;
use std::path::Path;
use super::conf::{self, Conf};
use super::error::{Error, Result};
use super::op_sum::{acm_hamiltonian, OperatorSum};
use super::scale::{adapt_with, SpectralResult};
use super::xspace::Truncation;

fn one() -> f64 {
    1.0
}

/// ```yaml
/// hamiltonian: [0.5, 0.5, 0, 0, 0, 0, 0, 0, 0, 0]
/// lambda: 2.5
/// truncation: { nu_min: 0, nu_max: 5, v_min: 0, v_max: 6,
///               l_min: 0, l_max: 4 }
/// conf: { basis_type: 1 }
/// ```
///
/// `a` defaults to 1.  Without a `conf` entry the process-wide registers
/// are used.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    /// Coefficients `x1 … x10` of the collective Hamiltonian.
    pub hamiltonian: [f64; 10],
    #[serde(default = "one")]
    pub a: f64,
    pub lambda: f64,
    pub truncation: Truncation,
    #[serde(default)]
    pub conf: Option<Conf>,
}

impl Job {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let job: Self = serde_yaml::from_str(s)
            .map_err(|e| Error::Config(e.to_string()))?;
        job.truncation.validate()?;
        if let Some(ref conf) = job.conf {
            conf.validate()?;
        }
        Ok(job)
    }

    pub fn load_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            Error::Config(msg) => {
                Error::Config(format!("{}: {}", path.display(), msg))
            }
            e => e,
        })
    }

    pub fn operator(&self) -> OperatorSum {
        acm_hamiltonian(self.hamiltonian)
    }

    /// Configuration in effect for this job.
    pub fn conf(&self) -> Conf {
        self.conf.clone().unwrap_or_else(conf::current)
    }

    pub fn run<W: Write>(&self, sink: &mut W) -> Result<SpectralResult> {
        adapt_with(&self.conf(), &self.operator(), self.a, self.lambda,
                   &self.truncation, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::error::ErrorKind;
    use super::super::spherical::BasisType;

    #[test]
    fn test_parse() {
        let job = Job::from_yaml_str("
hamiltonian: [0.5, 0.5, 0, 0, 0, 0, 0, 0, 0, 0]
lambda: 2.5
truncation: { nu_min: 0, nu_max: 3, v_min: 0, v_max: 3, l_min: 0, l_max: 2 }
conf: { basis_type: 1 }
").unwrap();
        assert_eq!(job.a, 1.0);
        assert_eq!(job.operator().len(), 3);
        assert_eq!(job.conf().basis_type, BasisType::Seniority);
        assert_eq!(job.conf().eig_ln, 6);

        assert_eq!(Job::from_yaml_str("
hamiltonian: [1, 0, 0, 0, 0, 0, 0, 0, 0, 0]
lambda: 2.5
truncation: { nu_min: 0, nu_max: 3, v_min: 0, v_max: 3, l_min: 2, l_max: 0 }
").unwrap_err().kind(), ErrorKind::Value);
        assert_eq!(Job::from_yaml_str("
hamiltonian: [1, 0, 0]
lambda: 2.5
truncation: { nu_min: 0, nu_max: 3, v_min: 0, v_max: 3, l_min: 0, l_max: 0 }
").unwrap_err().kind(), ErrorKind::Config);
    }
}
