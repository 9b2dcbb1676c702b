use crate::package::Package;
use crate::tracker::{ResTracker, ResourceIdAllocator, ResourceKind};
use cyclus_core::{KernelError, Quantity, QualId, EPS_RSRC};
use cyclus_recorder::Recorder;

/// A Resource specialized by a quality string rather than a composition
/// (§3, §4.3), e.g. bulk commodities with no nuclide content.
#[derive(Debug, Clone)]
pub struct Product {
    tracker: ResTracker,
    quantity: Quantity,
    units: String,
    quality: String,
    qual_id: QualId,
    unit_value: Option<f64>,
    package: String,
}

impl Product {
    pub fn create(
        alloc: &mut ResourceIdAllocator,
        quantity: Quantity,
        units: impl Into<String>,
        quality: impl Into<String>,
        qual_id: QualId,
    ) -> Result<Self, KernelError> {
        if quantity < 0.0 {
            return Err(KernelError::value("product quantity must be non-negative"));
        }
        Ok(Self {
            tracker: ResTracker::create(alloc),
            quantity,
            units: units.into(),
            quality: quality.into(),
            qual_id,
            unit_value: None,
            package: Package::unpackaged().name().to_owned(),
        })
    }

    pub fn with_unit_value(mut self, value: f64) -> Self {
        self.unit_value = Some(value);
        self
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

    pub fn quality(&self) -> &str {
        &self.quality
    }

    pub fn unit_value(&self) -> Option<f64> {
        self.unit_value
    }

    pub fn record(&self, recorder: &mut Recorder, time: cyclus_core::Time) {
        self.tracker.record(
            recorder,
            ResourceKind::Product,
            time,
            self.quantity,
            &self.units,
            self.qual_id,
            &self.package,
        );
    }

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
                "cannot extract {q} from product holding only {}",
                self.quantity
            )));
        }
        let extracted_tracker = self.tracker.extract(alloc);
        self.quantity = if remainder.abs() < EPS_RSRC { 0.0 } else { remainder };
        log::debug!(
            "product {} split: extracted {q}, {} remains on {}",
            extracted_tracker.obj_id(),
            self.quantity,
            self.tracker.obj_id()
        );
        Ok(Self {
            tracker: extracted_tracker,
            quantity: q,
            units: self.units.clone(),
            quality: self.quality.clone(),
            qual_id: self.qual_id,
            unit_value: self.unit_value,
            package: self.package.clone(),
        })
    }

    /// Merges `other` into `self`; unit values combine by quantity-weighted
    /// average (§3), `other` is emptied.
    pub fn absorb(&mut self, alloc: &mut ResourceIdAllocator, other: &mut Product) -> Result<(), KernelError> {
        if other.quality != self.quality {
            return Err(KernelError::value(format!(
                "cannot absorb product of quality '{}' into '{}'",
                other.quality, self.quality
            )));
        }
        let merged_value = match (self.unit_value, other.unit_value) {
            (Some(a), Some(b)) => {
                let total = self.quantity + other.quantity;
                Some((a * self.quantity + b * other.quantity) / total)
            }
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        log::debug!(
            "product {} absorbs {} ({} + {} -> {})",
            self.tracker.obj_id(),
            other.tracker.obj_id(),
            self.quantity,
            other.quantity,
            self.quantity + other.quantity
        );
        self.tracker.absorb(alloc, &other.tracker);
        self.quantity += other.quantity;
        self.unit_value = merged_value;
        other.quantity = 0.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_combines_unit_value_by_quantity_weighted_average() {
        let mut alloc = ResourceIdAllocator::new();
        let mut a = Product::create(&mut alloc, 1.0, "kg", "bananas", 1).unwrap().with_unit_value(10.0);
        let mut b = Product::create(&mut alloc, 3.0, "kg", "bananas", 1).unwrap().with_unit_value(2.0);
        a.absorb(&mut alloc, &mut b).unwrap();
        assert!((a.unit_value().unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(b.quantity(), 0.0);
    }

    #[test]
    fn absorbing_mismatched_quality_is_an_error() {
        let mut alloc = ResourceIdAllocator::new();
        let mut a = Product::create(&mut alloc, 1.0, "kg", "bananas", 1).unwrap();
        let mut b = Product::create(&mut alloc, 1.0, "kg", "power", 2).unwrap();
        assert!(a.absorb(&mut alloc, &mut b).is_err());
    }
}
