//! Covariance specifications and their external encodings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::VcovError;

/// Heteroskedasticity-robust estimator flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HcType {
    /// White sandwich with `n/(n−k)` degrees-of-freedom correction.
    #[default]
    Hc1,
    /// Squared residuals scaled by `1/(1 − h_i)`.
    Hc2,
    /// Squared residuals scaled by `1/(1 − h_i)²`.
    Hc3,
}

/// Cluster-robust estimator flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CrvType {
    /// Liang-Zeger sandwich over cluster scores.
    #[default]
    Crv1,
    /// Leave-one-cluster-out jackknife.
    Crv3,
}

/// Estimator actually used for a covariance matrix, without the cluster
/// column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcovType {
    /// Homoskedastic errors.
    Iid,
    /// Heteroskedasticity-robust.
    Hetero(HcType),
    /// Cluster-robust.
    Cluster(CrvType),
}

/// Requested covariance estimator.
///
/// Decoded from the external encodings:
///
/// | Encoding | Result |
/// |----------|--------|
/// | `"iid"` | [`VcovSpec::Iid`] |
/// | `"hetero"`, `"HC1"` | `Hetero(Hc1)` |
/// | `"HC2"`, `"HC3"` | `Hetero(Hc2)`, `Hetero(Hc3)` |
/// | `{ CRV1 = "firm" }` | `Cluster { kind: Crv1, cluster: "firm" }` |
/// | `[{ CRV3 = "firm" }]` | `Cluster { kind: Crv3, cluster: "firm" }` |
///
/// Names and keys are matched case-insensitively. Strings go through
/// [`FromStr`]; all three shapes are accepted by `serde`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "RawVcovSpec")]
pub enum VcovSpec {
    /// Homoskedastic errors.
    #[default]
    Iid,
    /// Heteroskedasticity-robust.
    Hetero(HcType),
    /// Cluster-robust, clustering on the named column.
    Cluster {
        /// Estimator flavour.
        kind: CrvType,
        /// Name of the cluster column.
        cluster: String,
    },
}

impl VcovSpec {
    /// Builds a cluster specification from a `CRV1`/`CRV3` key and a column.
    ///
    /// # Errors
    ///
    /// [`VcovError::UnknownClusterKey`] for any other key;
    /// [`VcovError::InvalidSpec`] for an empty column name.
    pub fn from_cluster_key(key: &str, column: &str) -> Result<Self, VcovError> {
        let kind = match key.to_lowercase().as_str() {
            "crv1" => CrvType::Crv1,
            "crv3" => CrvType::Crv3,
            _ => {
                return Err(VcovError::UnknownClusterKey {
                    key: key.to_string(),
                });
            }
        };
        let column = column.trim();
        if column.is_empty() {
            return Err(VcovError::InvalidSpec {
                reason: format!("{key} needs a cluster column name"),
            });
        }
        Ok(VcovSpec::Cluster {
            kind,
            cluster: column.to_string(),
        })
    }

    /// Estimator type, dropping the cluster column.
    pub fn kind(&self) -> VcovType {
        match self {
            VcovSpec::Iid => VcovType::Iid,
            VcovSpec::Hetero(hc) => VcovType::Hetero(*hc),
            VcovSpec::Cluster { kind, .. } => VcovType::Cluster(*kind),
        }
    }

    /// Cluster column name, for cluster specifications.
    pub fn cluster(&self) -> Option<&str> {
        match self {
            VcovSpec::Cluster { cluster, .. } => Some(cluster),
            _ => None,
        }
    }
}

impl FromStr for VcovSpec {
    type Err = VcovError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "iid" => Ok(VcovSpec::Iid),
            "hetero" | "hc1" => Ok(VcovSpec::Hetero(HcType::Hc1)),
            "hc2" => Ok(VcovSpec::Hetero(HcType::Hc2)),
            "hc3" => Ok(VcovSpec::Hetero(HcType::Hc3)),
            "crv1" | "crv3" => Err(VcovError::InvalidSpec {
                reason: format!("{s} needs a cluster column, e.g. {{ {s} = \"column\" }}"),
            }),
            _ => Err(VcovError::UnknownType {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for HcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HcType::Hc1 => f.write_str("HC1"),
            HcType::Hc2 => f.write_str("HC2"),
            HcType::Hc3 => f.write_str("HC3"),
        }
    }
}

impl fmt::Display for CrvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrvType::Crv1 => f.write_str("CRV1"),
            CrvType::Crv3 => f.write_str("CRV3"),
        }
    }
}

impl fmt::Display for VcovType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcovType::Iid => f.write_str("iid"),
            VcovType::Hetero(hc) => fmt::Display::fmt(hc, f),
            VcovType::Cluster(crv) => fmt::Display::fmt(crv, f),
        }
    }
}

impl fmt::Display for VcovSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcovSpec::Cluster { kind, cluster } => write!(f, "{kind}({cluster})"),
            other => fmt::Display::fmt(&other.kind(), f),
        }
    }
}

/// Shapes accepted on the wire before validation.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawVcovSpec {
    Name(String),
    Map(BTreeMap<String, String>),
    List(Vec<BTreeMap<String, String>>),
}

impl TryFrom<RawVcovSpec> for VcovSpec {
    type Error = VcovError;

    fn try_from(raw: RawVcovSpec) -> Result<Self, Self::Error> {
        match raw {
            RawVcovSpec::Name(name) => name.parse(),
            RawVcovSpec::Map(map) => from_map(map),
            RawVcovSpec::List(list) => {
                let len = list.len();
                let mut it = list.into_iter();
                match (it.next(), it.next()) {
                    (Some(map), None) => from_map(map),
                    _ => Err(VcovError::InvalidSpec {
                        reason: format!("expected a list with one cluster entry, got {len}"),
                    }),
                }
            }
        }
    }
}

fn from_map(map: BTreeMap<String, String>) -> Result<VcovSpec, VcovError> {
    let len = map.len();
    let mut it = map.into_iter();
    match (it.next(), it.next()) {
        (Some((key, column)), None) => VcovSpec::from_cluster_key(&key, &column),
        _ => Err(VcovError::InvalidSpec {
            reason: format!("cluster specification must have exactly one entry, got {len}"),
        }),
    }
}
