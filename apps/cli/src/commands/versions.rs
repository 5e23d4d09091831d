use clap::{Args, ValueEnum};
use eclipse_core::{LauncherApi, VersionKind};

#[derive(Args)]
pub struct VersionsArgs {
    /// Only list one kind of version
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Release,
    Snapshot,
    OldBeta,
    OldAlpha,
}

impl From<KindArg> for VersionKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Release => VersionKind::Release,
            KindArg::Snapshot => VersionKind::Snapshot,
            KindArg::OldBeta => VersionKind::OldBeta,
            KindArg::OldAlpha => VersionKind::OldAlpha,
        }
    }
}

const SECTIONS: [(VersionKind, &str); 4] = [
    (VersionKind::Release, "Releases"),
    (VersionKind::Snapshot, "Snapshots"),
    (VersionKind::OldBeta, "Old beta"),
    (VersionKind::OldAlpha, "Old alpha"),
];

pub async fn list(api: &LauncherApi, args: VersionsArgs) {
    let catalog = api.get_versions().await;
    if catalog.is_empty() {
        eprintln!("No versions available. Check your connection and try again.");
        return;
    }

    if let Some(kind) = args.kind {
        for id in catalog.get(kind.into()) {
            println!("{id}");
        }
        return;
    }

    for (kind, title) in SECTIONS {
        let ids = catalog.get(kind);
        if ids.is_empty() {
            continue;
        }
        println!("{title} ({})", ids.len());
        for id in ids {
            println!("  {id}");
        }
    }
}
