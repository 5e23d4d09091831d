use serde::{Deserialize, Serialize};

use crate::install::VersionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
}

impl VersionKind {
    pub fn from_manifest(kind: &str) -> Option<Self> {
        match kind {
            "release" => Some(VersionKind::Release),
            "snapshot" => Some(VersionKind::Snapshot),
            "old_beta" => Some(VersionKind::OldBeta),
            "old_alpha" => Some(VersionKind::OldAlpha),
            _ => None,
        }
    }
}

/// Version ids grouped the way the version filter presents them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionCatalog {
    pub release: Vec<String>,
    pub snapshot: Vec<String>,
    pub old_beta: Vec<String>,
    pub old_alpha: Vec<String>,
}

impl VersionCatalog {
    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a VersionSummary>) -> Self {
        let mut catalog = Self::default();
        for summary in summaries {
            let Some(kind) = VersionKind::from_manifest(&summary.kind) else {
                continue;
            };
            catalog.bucket_mut(kind).push(summary.id.clone());
        }
        catalog
    }

    pub fn get(&self, kind: VersionKind) -> &[String] {
        match kind {
            VersionKind::Release => &self.release,
            VersionKind::Snapshot => &self.snapshot,
            VersionKind::OldBeta => &self.old_beta,
            VersionKind::OldAlpha => &self.old_alpha,
        }
    }

    fn bucket_mut(&mut self, kind: VersionKind) -> &mut Vec<String> {
        match kind {
            VersionKind::Release => &mut self.release,
            VersionKind::Snapshot => &mut self.snapshot,
            VersionKind::OldBeta => &mut self.old_beta,
            VersionKind::OldAlpha => &mut self.old_alpha,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.release.is_empty()
            && self.snapshot.is_empty()
            && self.old_beta.is_empty()
            && self.old_alpha.is_empty()
    }
}
