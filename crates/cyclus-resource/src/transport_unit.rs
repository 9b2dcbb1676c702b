use cyclus_core::KernelError;

/// How a [`TransportUnit`] groups packaged item counts for shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStrategy {
    First,
    Equal,
    Hybrid,
}

/// A named integer-count packaging rule computing how many packaged items
/// ship together (§3). The reserved name `"unrestricted"` is a singleton
/// passing all counts through.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportUnit {
    name: String,
    fill_min: u64,
    fill_max: u64,
    strategy: TransportStrategy,
}

impl TransportUnit {
    pub fn new(
        name: impl Into<String>,
        fill_min: u64,
        fill_max: u64,
        strategy: TransportStrategy,
    ) -> Result<Self, KernelError> {
        if fill_max < fill_min || fill_max == 0 {
            return Err(KernelError::value(format!(
                "invalid transport unit fill range [{fill_min}, {fill_max}]"
            )));
        }
        Ok(Self {
            name: name.into(),
            fill_min,
            fill_max,
            strategy,
        })
    }

    pub fn unrestricted() -> Self {
        Self {
            name: "unrestricted".to_owned(),
            fill_min: 0,
            fill_max: u64::MAX,
            strategy: TransportStrategy::First,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_unrestricted(&self) -> bool {
        self.name == "unrestricted"
    }

    /// Groups `item_count` packaged items into shipments honoring the
    /// fill range.
    pub fn group_sizes(&self, item_count: u64) -> Result<Vec<u64>, KernelError> {
        if self.is_unrestricted() {
            return Ok(vec![item_count]);
        }
        if item_count < self.fill_min {
            return Err(KernelError::value(format!(
                "{item_count} items is below transport unit '{}' fill_min {}",
                self.name, self.fill_min
            )));
        }
        let mut remaining = item_count;
        let mut groups = Vec::new();
        while remaining >= self.fill_max {
            groups.push(self.fill_max);
            remaining -= self.fill_max;
        }
        if remaining >= self.fill_min {
            groups.push(remaining);
        } else if remaining > 0 {
            match groups.last_mut() {
                Some(last) => *last += remaining,
                None => groups.push(remaining),
            }
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_passes_count_through() {
        assert_eq!(TransportUnit::unrestricted().group_sizes(7).unwrap(), vec![7]);
    }

    #[test]
    fn first_strategy_groups_then_trails_remainder() {
        let unit = TransportUnit::new("cask", 1, 5, TransportStrategy::First).unwrap();
        assert_eq!(unit.group_sizes(12).unwrap(), vec![5, 5, 2]);
    }
}
