use crate::composition::{Composition, CompositionTable, NucId};
use crate::package::Package;
use crate::tracker::{ResTracker, ResourceIdAllocator, ResourceKind};
use cyclus_core::{KernelError, Quantity, EPS_RSRC};
use cyclus_recorder::Recorder;

/// A Resource specialized by a [`Composition`] (§3, §4.3).
#[derive(Debug, Clone)]
pub struct Material {
    tracker: ResTracker,
    quantity: Quantity,
    units: String,
    composition: Composition,
    package: String,
}

impl Material {
    /// `Material::Create` — assigns obj_id, bumps state_id, records via
    /// `ResTracker`.
    pub fn create(
        alloc: &mut ResourceIdAllocator,
        quantity: Quantity,
        units: impl Into<String>,
        composition: Composition,
    ) -> Result<Self, KernelError> {
        if quantity < 0.0 {
            return Err(KernelError::value("material quantity must be non-negative"));
        }
        Ok(Self {
            tracker: ResTracker::create(alloc),
            quantity,
            units: units.into(),
            composition,
            package: Package::unpackaged().name().to_owned(),
        })
    }

    pub fn obj_id(&self) -> cyclus_core::ObjId {
        self.tracker.obj_id()
    }

    pub fn state_id(&self) -> cyclus_core::StateId {
        self.tracker.state_id()
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn package_name(&self) -> &str {
        &self.package
    }

    pub fn disable_tracking(&mut self) {
        self.tracker.disable();
    }

    pub fn record(&self, recorder: &mut Recorder, time: cyclus_core::Time) {
        self.tracker.record(
            recorder,
            ResourceKind::Material,
            time,
            self.quantity,
            &self.units,
            self.composition.qual_id(),
            &self.package,
        );
    }

    /// `Material::ExtractQty(q)` — mutates self to leftover, returns a new
    /// resource of quantity `q` with identical composition. If `q` equals
    /// the current quantity within `eps_rsrc`, the source is emptied but
    /// not destroyed.
    pub fn extract_qty(
        &mut self,
        alloc: &mut ResourceIdAllocator,
        q: Quantity,
    ) -> Result<Self, KernelError> {
        if q < 0.0 {
            return Err(KernelError::value("cannot extract a negative quantity"));
        }
        let remainder = self.quantity - q;
        if remainder < -EPS_RSRC {
            return Err(KernelError::value(format!(
                "cannot extract {q} from material holding only {}",
                self.quantity
            )));
        }
        let extracted_tracker = self.tracker.extract(alloc);
        self.quantity = if remainder.abs() < EPS_RSRC { 0.0 } else { remainder };
        log::debug!(
            "material {} split: extracted {q}, {} remains on {}",
            extracted_tracker.obj_id(),
            self.quantity,
            self.tracker.obj_id()
        );
        Ok(Self {
            tracker: extracted_tracker,
            quantity: q,
            units: self.units.clone(),
            composition: self.composition.clone(),
            package: self.package.clone(),
        })
    }

    /// `Material::ExtractComp(q, comp)` — removes a resource of quantity
    /// `q` at composition `comp`; the complement remains in `self` at its
    /// original composition (separation, §4.3).
    pub fn extract_comp(
        &mut self,
        alloc: &mut ResourceIdAllocator,
        q: Quantity,
        comp: Composition,
    ) -> Result<Self, KernelError> {
        if q < 0.0 || q - self.quantity > EPS_RSRC {
            return Err(KernelError::value(format!(
                "cannot separate {q} from material holding only {}",
                self.quantity
            )));
        }
        let extracted_tracker = self.tracker.extract(alloc);
        let remainder = self.quantity - q;
        self.quantity = if remainder.abs() < EPS_RSRC { 0.0 } else { remainder };
        log::debug!(
            "material {} separated: extracted {q} at a distinct composition, {} remains on {}",
            extracted_tracker.obj_id(),
            self.quantity,
            self.tracker.obj_id()
        );
        Ok(Self {
            tracker: extracted_tracker,
            quantity: q,
            units: self.units.clone(),
            composition: comp,
            package: self.package.clone(),
        })
    }

    /// `Material::Absorb(other)` — merges `other` into `self`; composition
    /// becomes the mass-weighted mixture; `other` is emptied.
    pub fn absorb(
        &mut self,
        alloc: &mut ResourceIdAllocator,
        table: &mut CompositionTable,
        other: &mut Material,
    ) -> Result<(), KernelError> {
        let mixed = table.mix(&self.composition, self.quantity, &other.composition, other.quantity)?;
        log::debug!(
            "material {} absorbs {} ({} + {} -> {})",
            self.tracker.obj_id(),
            other.tracker.obj_id(),
            self.quantity,
            other.quantity,
            self.quantity + other.quantity
        );
        self.tracker.absorb(alloc, &other.tracker);
        self.quantity += other.quantity;
        self.composition = mixed;
        other.quantity = 0.0;
        Ok(())
    }

    /// `Repackage(r, pkg)` — returns a sequence of resources whose
    /// quantities follow `pkg`'s fill rule; any trailing remainder per
    /// `Package::split_sizes` stays attached to the last returned piece,
    /// and `self` is emptied (§4.3).
    pub fn repackage(
        &mut self,
        alloc: &mut ResourceIdAllocator,
        package: &Package,
    ) -> Result<Vec<Self>, KernelError> {
        let sizes = package.split_sizes(self.quantity)?;
        let mut pieces = Vec::with_capacity(sizes.len());
        for size in sizes {
            let mut piece = self.extract_qty(alloc, size)?;
            piece.package = package.name().to_owned();
            piece.tracker.modify(alloc);
            pieces.push(piece);
        }
        Ok(pieces)
    }

    pub fn mass_frac_of(&self, nuc: NucId) -> Quantity {
        self.composition.mass_frac_of(nuc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_material(alloc: &mut ResourceIdAllocator, table: &mut CompositionTable, qty: f64) -> Material {
        let comp = table.intern(vec![(922350000, 1.0)]).unwrap();
        Material::create(alloc, qty, "kg", comp).unwrap()
    }

    #[test]
    fn extract_qty_leaves_conserved_remainder() {
        let mut alloc = ResourceIdAllocator::new();
        let mut table = CompositionTable::new();
        let mut m = unit_material(&mut alloc, &mut table, 10.0);
        let extracted = m.extract_qty(&mut alloc, 4.0).unwrap();
        assert!((m.quantity() + extracted.quantity() - 10.0).abs() < EPS_RSRC);
        assert_eq!(m.obj_id(), extracted.obj_id());
    }

    #[test]
    fn extracting_full_quantity_empties_without_error() {
        let mut alloc = ResourceIdAllocator::new();
        let mut table = CompositionTable::new();
        let mut m = unit_material(&mut alloc, &mut table, 5.0);
        let extracted = m.extract_qty(&mut alloc, 5.0).unwrap();
        assert_eq!(m.quantity(), 0.0);
        assert_eq!(extracted.quantity(), 5.0);
    }

    #[test]
    fn extracting_more_than_held_is_an_error() {
        let mut alloc = ResourceIdAllocator::new();
        let mut table = CompositionTable::new();
        let mut m = unit_material(&mut alloc, &mut table, 5.0);
        assert!(m.extract_qty(&mut alloc, 6.0).is_err());
    }

    #[test]
    fn absorb_empties_the_absorbed_resource_and_mixes_composition() {
        let mut alloc = ResourceIdAllocator::new();
        let mut table = CompositionTable::new();
        let u235 = table.intern(vec![(922350000, 1.0)]).unwrap();
        let u238 = table.intern(vec![(922380000, 1.0)]).unwrap();
        let mut a = Material::create(&mut alloc, 1.0, "kg", u235).unwrap();
        let mut b = Material::create(&mut alloc, 3.0, "kg", u238).unwrap();
        a.absorb(&mut alloc, &mut table, &mut b).unwrap();
        assert_eq!(b.quantity(), 0.0);
        assert!((a.quantity() - 4.0).abs() < EPS_RSRC);
        assert!((a.mass_frac_of(922350000) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn repackage_round_trip_preserves_total_quantity() {
        let mut alloc = ResourceIdAllocator::new();
        let mut table = CompositionTable::new();
        let mut m = unit_material(&mut alloc, &mut table, 23.0);
        let pkg = Package::new("drum", 1.0, 10.0, crate::package::FillStrategy::First).unwrap();
        let pieces = m.repackage(&mut alloc, &pkg).unwrap();
        let total: f64 = pieces.iter().map(Material::quantity).sum();
        assert!((total - 23.0).abs() < EPS_RSRC);
        assert_eq!(m.quantity(), 0.0);
    }
}
