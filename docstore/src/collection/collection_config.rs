use crate::collection::{IdStrategy, ReservedKeys};

/// Per-collection settings, fixed when the collection is opened.
///
/// A database derives one `CollectionConfig` from its own configuration and
/// hands a copy to every collection it opens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionConfig {
    id_strategy: IdStrategy,
    autosync: bool,
    reserved_keys: ReservedKeys,
}

impl CollectionConfig {
    pub fn new(id_strategy: IdStrategy, autosync: bool, reserved_keys: ReservedKeys) -> Self {
        CollectionConfig {
            id_strategy,
            autosync,
            reserved_keys,
        }
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.id_strategy
    }

    /// When true every mutation is persisted before the call returns;
    /// otherwise changes wait for an explicit sync or commit.
    pub fn autosync(&self) -> bool {
        self.autosync
    }

    pub fn reserved_keys(&self) -> &ReservedKeys {
        &self.reserved_keys
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        CollectionConfig::new(IdStrategy::default(), true, ReservedKeys::default())
    }
}
