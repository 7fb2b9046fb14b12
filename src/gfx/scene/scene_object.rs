use cgmath::Matrix4;

use crate::{
    error::{LanternError, Result},
    gfx::{model::ModelId, transform::WorldTransform},
};

/// Handle to an object stored in a [`super::Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneObjectId(pub(crate) usize);

impl SceneObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A placed instance of a model.
///
/// Objects without a model are kept in the scene but skipped when drawing.
#[derive(Debug, Clone, Default)]
pub struct SceneObject {
    pub transform: WorldTransform,
    /// Overrides every material color when set.
    pub flat_color: Option<[f32; 4]>,
    model: Option<ModelId>,
}

impl SceneObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: ModelId) -> Self {
        Self {
            model: Some(model),
            ..Default::default()
        }
    }

    pub fn model(&self) -> Option<ModelId> {
        self.model
    }

    /// Attaches a model. An object's model can only be set once.
    pub fn set_model(&mut self, model: ModelId) -> Result<()> {
        if self.model.is_some() {
            return Err(LanternError::ModelAlreadySet);
        }
        self.model = Some(model);
        Ok(())
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_position(x, y, z);
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.transform.set_rotation(x, y, z);
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.transform.set_scale(scale);
    }

    pub fn set_flat_color(&mut self, color: [f32; 4]) {
        self.flat_color = Some(color);
    }

    /// Translation, then rotation (Z·Y·X, degrees), then scale.
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.transform.world_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn test_set_model_only_once() {
        let mut object = SceneObject::new();
        assert!(object.model().is_none());

        object.set_model(ModelId(2)).unwrap();
        assert_eq!(object.model(), Some(ModelId(2)));
        assert!(matches!(
            object.set_model(ModelId(3)),
            Err(LanternError::ModelAlreadySet)
        ));
        assert_eq!(object.model(), Some(ModelId(2)));
    }

    #[test]
    fn test_world_matrix_scales_before_translating() {
        let mut object = SceneObject::with_model(ModelId(0));
        object.set_position(10.0, 0.0, 0.0);
        object.set_scale(2.0);

        let p = object.world_matrix() * Vector4::new(1.0, 1.0, 0.0, 1.0);
        assert!((p.x - 12.0).abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
    }
}
