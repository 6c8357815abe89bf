//! Target selection: which regions of a table a sculpt applies to.

use sculptor_core::TARGET_ALL;

use crate::ArchitectureTable;

/// A resolved target option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    /// Every region, concatenated in canonical order, under one gradient.
    All,
    /// A single named region.
    Region(String),
    /// The table's synced pair, each region with its own gradient.
    Synced,
}

impl TargetSelection {
    /// Resolve a user-facing option string against a table.
    ///
    /// Returns `None` when the option names nothing the table knows.
    pub fn parse(option: &str, table: &ArchitectureTable) -> Option<Self> {
        if option == TARGET_ALL {
            Some(Self::All)
        } else if option == table.synced().label {
            Some(Self::Synced)
        } else if table.region(option).is_some() {
            Some(Self::Region(option.to_string()))
        } else {
            None
        }
    }

    /// Ordered groups of prefixes, one gradient per group.
    ///
    /// Each group is `(name, prefixes)`. `All` and `Region` yield one group;
    /// `Synced` yields two.
    pub fn groups<'t>(&self, table: &'t ArchitectureTable) -> Vec<(String, Vec<&'t str>)> {
        let region_group = |name: &str| {
            table.region(name).map(|r| {
                let prefixes = r.prefixes.iter().map(String::as_str).collect::<Vec<_>>();
                (r.name.clone(), prefixes)
            })
        };

        match self {
            Self::All => vec![(TARGET_ALL.to_string(), table.all_prefixes())],
            Self::Region(name) => region_group(name.as_str()).into_iter().collect(),
            Self::Synced => {
                let pair = table.synced();
                [pair.first.as_str(), pair.second.as_str()]
                    .into_iter()
                    .filter_map(region_group)
                    .collect()
            }
        }
    }

    /// Option string this selection was parsed from.
    pub fn option<'t>(&'t self, table: &'t ArchitectureTable) -> &'t str {
        match self {
            Self::All => TARGET_ALL,
            Self::Region(name) => name.as_str(),
            Self::Synced => table.synced().label.as_str(),
        }
    }
}
