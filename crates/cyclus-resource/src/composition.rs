use cyclus_core::{KernelError, QualId};
use std::collections::HashMap;

/// `Z*1e7 + A*1e4 + M`, the original's packed nuclide id.
pub type NucId = u64;

/// An immutable, normalized nuclide-fraction map (§3).
///
/// Two `Composition`s with identical normalized maps are interned to the
/// same `qual_id` by [`CompositionTable`]; the type itself carries whatever
/// `qual_id` the table assigned at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    qual_id: QualId,
    mass_frac: Vec<(NucId, f64)>,
}

impl Composition {
    /// `qual_id` is assigned later by [`CompositionTable::intern`]; this
    /// constructor just normalizes the fractions.
    fn normalize(mut frac: Vec<(NucId, f64)>) -> Result<Vec<(NucId, f64)>, KernelError> {
        if frac.is_empty() {
            return Err(KernelError::value("composition must have at least one nuclide"));
        }
        let total: f64 = frac.iter().map(|(_, f)| f).sum();
        if total <= 0.0 {
            return Err(KernelError::value("composition fractions must sum to a positive value"));
        }
        frac.sort_by_key(|(nuc, _)| *nuc);
        for (_, f) in frac.iter_mut() {
            *f /= total;
        }
        Ok(frac)
    }

    pub fn qual_id(&self) -> QualId {
        self.qual_id
    }

    pub fn mass_frac(&self) -> &[(NucId, f64)] {
        &self.mass_frac
    }

    pub fn mass_frac_of(&self, nuc: NucId) -> f64 {
        self.mass_frac
            .iter()
            .find(|(n, _)| *n == nuc)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Mass-weighted mixture of `self` (at `self_qty`) and `other` (at
    /// `other_qty`), interned through `table` under a fresh or reused
    /// `qual_id`.
    fn mixture(
        &self,
        self_qty: f64,
        other: &Composition,
        other_qty: f64,
    ) -> Vec<(NucId, f64)> {
        let mut mixed: HashMap<NucId, f64> = HashMap::new();
        for (nuc, frac) in &self.mass_frac {
            *mixed.entry(*nuc).or_default() += frac * self_qty;
        }
        for (nuc, frac) in &other.mass_frac {
            *mixed.entry(*nuc).or_default() += frac * other_qty;
        }
        let total = self_qty + other_qty;
        let mut out: Vec<(NucId, f64)> = mixed.into_iter().map(|(n, m)| (n, m / total)).collect();
        out.sort_by_key(|(nuc, _)| *nuc);
        out
    }
}

/// Interns normalized nuclide maps so identical compositions share a
/// `qual_id`, and is the authority that records each unique `qual_id` to
/// the output stream exactly once (§3: "Each unique qual_id is recorded
/// once in the output stream.").
#[derive(Debug, Default)]
pub struct CompositionTable {
    next_qual_id: QualId,
    by_frac: HashMap<Vec<(NucId, u64)>, QualId>,
    recorded: std::collections::HashSet<QualId>,
}

impl CompositionTable {
    pub fn new() -> Self {
        Self {
            next_qual_id: 1,
            by_frac: HashMap::new(),
            recorded: std::collections::HashSet::new(),
        }
    }

    /// Normalizes `frac`, assigning a shared `qual_id` to compositions with
    /// an identical normalized map.
    pub fn intern(&mut self, frac: Vec<(NucId, f64)>) -> Result<Composition, KernelError> {
        let normalized = Composition::normalize(frac)?;
        let key: Vec<(NucId, u64)> = normalized
            .iter()
            .map(|(nuc, f)| (*nuc, (f * 1e12).round() as u64))
            .collect();
        let qual_id = *self.by_frac.entry(key).or_insert_with(|| {
            let id = self.next_qual_id;
            self.next_qual_id += 1;
            id
        });
        Ok(Composition {
            qual_id,
            mass_frac: normalized,
        })
    }

    pub fn mix(
        &mut self,
        a: &Composition,
        a_qty: f64,
        b: &Composition,
        b_qty: f64,
    ) -> Result<Composition, KernelError> {
        self.intern(a.mixture(a_qty, b, b_qty))
    }

    /// True the first time a `qual_id` is seen; callers record a
    /// `Compositions` row only on the first sighting.
    pub fn mark_recorded(&mut self, qual_id: QualId) -> bool {
        self.recorded.insert(qual_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_fractions_share_a_qual_id() {
        let mut table = CompositionTable::new();
        let a = table.intern(vec![(922350000, 0.04), (922380000, 0.96)]).unwrap();
        let b = table.intern(vec![(922380000, 0.96), (922350000, 0.04)]).unwrap();
        assert_eq!(a.qual_id(), b.qual_id());
    }

    #[test]
    fn fractions_normalize_to_unity() {
        let mut table = CompositionTable::new();
        let c = table.intern(vec![(922350000, 4.0), (922380000, 96.0)]).unwrap();
        let sum: f64 = c.mass_frac().iter().map(|(_, f)| f).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mark_recorded_is_true_only_on_first_sighting() {
        let mut table = CompositionTable::new();
        let c = table.intern(vec![(922350000, 1.0)]).unwrap();
        assert!(table.mark_recorded(c.qual_id()));
        assert!(!table.mark_recorded(c.qual_id()));
    }

    #[test]
    fn mixture_is_mass_weighted() {
        let mut table = CompositionTable::new();
        let a = table.intern(vec![(1, 1.0)]).unwrap();
        let b = table.intern(vec![(2, 1.0)]).unwrap();
        let mixed = table.mix(&a, 1.0, &b, 3.0).unwrap();
        assert!((mixed.mass_frac_of(1) - 0.25).abs() < 1e-9);
        assert!((mixed.mass_frac_of(2) - 0.75).abs() < 1e-9);
    }
}
