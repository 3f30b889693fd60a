/*

    Hitbox entity: a named, transformable box.

    `size` is the extent of the box geometry itself (what gets
    exported), `scale` is the transform scale applied on top of it
    by the drag gizmos, they are deliberately kept apart.

    @date: Nov, 2025
*/

use crate::prelude::*;

pub const COLOR_IDLE: u32 = 0xff0000;
pub const COLOR_SELECTED: u32 = 0xffffff;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HitboxId(pub u64);

/// How the hitbox came to be. Not needed for correctness, handy for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Manual,
    Auto,
}

/// Text attached above the box, offset is local to the hitbox.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub offset: Vector3,
}

#[derive(Debug, Clone)]
pub struct Hitbox {
    pub id: HitboxId,
    pub name: String,
    pub position: Vector3,
    /// Euler XYZ, radians.
    pub rotation: Vector3,
    pub scale: Vector3,
    pub size: Vector3,
    pub provenance: Provenance,
    pub label: Label,
}

impl Hitbox {
    pub fn new(id: HitboxId, name: String, position: Vector3, size: Vector3, provenance: Provenance, label_height: Float) -> Self {
        let label = Label {
            text: name.clone(),
            offset: Vector3::new(0.0, label_height, 0.0),
        };
        Self {
            id,
            name,
            position,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
            size,
            provenance,
            label,
        }
    }

    /// Renaming rebuilds the label text, the label stays where it was.
    pub fn set_name(&mut self, name: String) {
        self.label.text = name.clone();
        self.name = name;
    }

    pub fn rotation_degrees(&self) -> Vector3 {
        Vector3::new(
            self.rotation.x.to_degrees(),
            self.rotation.y.to_degrees(),
            self.rotation.z.to_degrees(),
        )
    }

    pub fn is_auto(&self) -> bool {
        self.provenance == Provenance::Auto
    }
}


/// Field-wise transform update coming from the UI host (form inputs or a gizmo drag).
/// Missing or non-finite values keep the current one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformEdit {
    pub position: [Option<Float>; 3],
    /// Degrees, as typed by the user.
    pub rotation_degrees: [Option<Float>; 3],
    pub scale: [Option<Float>; 3],
}

impl TransformEdit {
    pub fn position(position: Vector3) -> Self {
        Self { position: position.to_array().map(Some), ..Default::default() }
    }

    pub fn rotation_degrees(degrees: Vector3) -> Self {
        Self { rotation_degrees: degrees.to_array().map(Some), ..Default::default() }
    }

    pub fn scale(scale: Vector3) -> Self {
        Self { scale: scale.to_array().map(Some), ..Default::default() }
    }

    pub fn apply(&self, hitbox: &mut Hitbox) {
        let merge = |current: Vector3, edit: &[Option<Float>; 3], map: fn(Float) -> Float| -> Vector3 {
            let mut out = current.to_array();
            for (slot, value) in out.iter_mut().zip(edit) {
                if let Some(v) = value.filter(|v| v.is_finite()) {
                    *slot = map(v);
                }
            }
            Vector3::from_array(out)
        };
        hitbox.position = merge(hitbox.position, &self.position, |v| v);
        hitbox.rotation = merge(hitbox.rotation, &self.rotation_degrees, Float::to_radians);
        hitbox.scale = merge(hitbox.scale, &self.scale, |v| v);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sample_box() -> Hitbox {
        Hitbox::new(HitboxId(0), "hitbox_0".into(), Vector3::new(0., 0.5, 0.), Vector3::ONE, Provenance::Manual, 1.2)
    }

    #[test]
    fn test_new_defaults() {
        let hb = sample_box();
        assert_eq!(hb.scale, Vector3::ONE);
        assert_eq!(hb.rotation, Vector3::ZERO);
        assert_eq!(hb.label.text, "hitbox_0");
        assert_eq!(hb.label.offset, Vector3::new(0., 1.2, 0.));
        assert!(!hb.is_auto());
    }

    #[test]
    fn test_rename_keeps_label_offset() {
        let mut hb = sample_box();
        hb.label.offset = Vector3::new(0., 0.35, 0.);
        hb.set_name("head".into());
        assert_eq!(hb.name, "head");
        assert_eq!(hb.label.text, "head");
        assert_eq!(hb.label.offset, Vector3::new(0., 0.35, 0.));
    }

    #[test]
    fn test_partial_edit() {
        let mut hb = sample_box();
        let edit = TransformEdit {
            position: [Some(2.0), None, Some(Float::NAN)],
            rotation_degrees: [None, Some(90.0), None],
            scale: [None, None, Some(3.0)],
        };
        edit.apply(&mut hb);
        assert_eq!(hb.position, Vector3::new(2., 0.5, 0.));
        assert!(approx_zero(hb.rotation.y - std::f64::consts::FRAC_PI_2));
        assert!(approx_zero(hb.rotation_degrees().y - 90.0));
        assert_eq!(hb.scale, Vector3::new(1., 1., 3.));
    }

    #[test]
    fn test_whole_vector_edits() {
        let mut hb = sample_box();
        TransformEdit::position(Vector3::new(1., 2., 3.)).apply(&mut hb);
        TransformEdit::scale(Vector3::splat(2.)).apply(&mut hb);
        assert_eq!(hb.position, Vector3::new(1., 2., 3.));
        assert_eq!(hb.scale, Vector3::splat(2.));
        assert_eq!(hb.rotation, Vector3::ZERO);
    }
}
