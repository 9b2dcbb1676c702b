use cyclus_core::{KernelError, Quantity};

/// How a [`Package`] divides a remainder among pieces once the leading
/// pieces are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStrategy {
    First,
    Equal,
    Uniform,
    Normal,
}

/// A named fill rule governing how `Repackage` divides a resource (§3, §4.3).
///
/// The reserved name `"unpackaged"` is the default no-constraint package and
/// is always available via [`Package::unpackaged`].
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    name: String,
    fill_min: Quantity,
    fill_max: Quantity,
    strategy: FillStrategy,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        fill_min: Quantity,
        fill_max: Quantity,
        strategy: FillStrategy,
    ) -> Result<Self, KernelError> {
        if fill_min < 0.0 || fill_max < fill_min {
            return Err(KernelError::value(format!(
                "invalid package fill range [{fill_min}, {fill_max}]"
            )));
        }
        Ok(Self {
            name: name.into(),
            fill_min,
            fill_max,
            strategy,
        })
    }

    /// The singleton no-constraint package: any quantity fills one piece.
    pub fn unpackaged() -> Self {
        Self {
            name: "unpackaged".to_owned(),
            fill_min: 0.0,
            fill_max: Quantity::INFINITY,
            strategy: FillStrategy::First,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_unpackaged(&self) -> bool {
        self.name == "unpackaged"
    }

    pub fn fill_min(&self) -> Quantity {
        self.fill_min
    }

    pub fn fill_max(&self) -> Quantity {
        self.fill_max
    }

    pub fn strategy(&self) -> FillStrategy {
        self.strategy
    }

    /// Splits `total` into piece sizes following `fill_min`/`fill_max`,
    /// leaving any remainder `>= fill_min` as a trailing piece (§3).
    ///
    /// The `Uniform`/`Normal` strategies are distinguished at the archetype
    /// layer (out of scope here, a random draw around a distribution
    /// centered in the fill range); the kernel's reference splitter treats
    /// both as `Equal` since it owns no archetype-level RNG policy.
    pub fn split_sizes(&self, total: Quantity) -> Result<Vec<Quantity>, KernelError> {
        if total < 0.0 {
            return Err(KernelError::value("cannot package a negative quantity"));
        }
        if self.is_unpackaged() {
            return Ok(vec![total]);
        }
        if total < self.fill_min {
            return Err(KernelError::value(format!(
                "quantity {total} is below package '{}' fill_min {}",
                self.name, self.fill_min
            )));
        }
        let mut remaining = total;
        let mut pieces = Vec::new();
        match self.strategy {
            FillStrategy::First => {
                while remaining >= self.fill_max {
                    pieces.push(self.fill_max);
                    remaining -= self.fill_max;
                }
                if remaining >= self.fill_min {
                    pieces.push(remaining);
                } else if remaining > 0.0 {
                    if let Some(last) = pieces.last_mut() {
                        *last += remaining;
                    } else {
                        pieces.push(remaining);
                    }
                }
            }
            FillStrategy::Equal | FillStrategy::Uniform | FillStrategy::Normal => {
                let n = (total / self.fill_max).ceil().max(1.0) as u64;
                let each = total / n as f64;
                pieces = vec![each; n as usize];
            }
        }
        Ok(pieces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpackaged_passes_quantity_through() {
        let pkg = Package::unpackaged();
        assert_eq!(pkg.split_sizes(42.0).unwrap(), vec![42.0]);
    }

    #[test]
    fn first_strategy_fills_max_then_trailing_remainder() {
        let pkg = Package::new("drum", 1.0, 10.0, FillStrategy::First).unwrap();
        let pieces = pkg.split_sizes(23.0).unwrap();
        assert_eq!(pieces, vec![10.0, 10.0, 3.0]);
    }

    #[test]
    fn remainder_below_fill_min_merges_into_last_piece() {
        let pkg = Package::new("drum", 5.0, 10.0, FillStrategy::First).unwrap();
        let pieces = pkg.split_sizes(24.0).unwrap();
        assert_eq!(pieces, vec![10.0, 14.0]);
    }

    #[test]
    fn below_fill_min_is_an_error() {
        let pkg = Package::new("drum", 5.0, 10.0, FillStrategy::First).unwrap();
        assert!(pkg.split_sizes(2.0).is_err());
    }
}
