use std::{collections::HashMap, path::Path};

use cgmath::Vector3;
use log::{info, warn};

use super::scene_object::{SceneObject, SceneObjectId};
use crate::{
    error::{LanternError, Result},
    gfx::{
        camera::{BasicCamera, PersProjInfo},
        geometry::{generate_cube, generate_sphere, generate_square},
        lighting::{DirectionalLight, PointLight, SpotLight},
        model::{load_model, ModelData, ModelId},
    },
};

pub const MAX_SCENE_OBJECTS: usize = 1024;

const DEFAULT_FOV_DEGREES: f32 = 45.0;
const DEFAULT_Z_NEAR: f32 = 1.0;
const DEFAULT_Z_FAR: f32 = 1000.0;

const SPHERE_LONGITUDE_SEGMENTS: u32 = 32;
const SPHERE_LATITUDE_SEGMENTS: u32 = 16;

/// Counts reported by [`Scene::statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SceneStatistics {
    pub objects: usize,
    pub render_list: usize,
    pub models: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Objects, the models they reference, lights and the active camera.
pub struct Scene {
    objects: Vec<SceneObject>,
    render_list: Vec<SceneObjectId>,
    models: Vec<ModelData>,
    basic_shapes: HashMap<String, ModelId>,
    dir_lights: Vec<DirectionalLight>,
    point_lights: Vec<PointLight>,
    spot_lights: Vec<SpotLight>,
    camera: BasicCamera,
    window_width: u32,
    window_height: u32,
    pub clear_frame: bool,
    pub clear_color: [f32; 4],
}

impl Scene {
    pub fn new(window_width: u32, window_height: u32, load_basic_shapes: bool) -> Self {
        let mut scene = Self {
            objects: Vec::new(),
            render_list: Vec::new(),
            models: Vec::new(),
            basic_shapes: HashMap::new(),
            dir_lights: Vec::new(),
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
            camera: default_camera(window_width, window_height),
            window_width,
            window_height,
            clear_frame: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        };

        if load_basic_shapes {
            scene.load_basic_shapes();
        }

        scene
    }

    fn load_basic_shapes(&mut self) {
        let shapes = [
            ("square", generate_square()),
            ("cube", generate_cube()),
            (
                "sphere",
                generate_sphere(SPHERE_LONGITUDE_SEGMENTS, SPHERE_LATITUDE_SEGMENTS),
            ),
        ];

        for (name, geometry) in shapes {
            let id = self.add_model(geometry.into_model_data(name));
            self.basic_shapes.insert(name.to_owned(), id);
        }
    }

    /// Adds an already-built model to the library.
    pub fn add_model(&mut self, model: ModelData) -> ModelId {
        self.models.push(model);
        ModelId(self.models.len() - 1)
    }

    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<ModelId> {
        let model = load_model(path, self.window_width, self.window_height)?;
        Ok(self.add_model(model))
    }

    /// Loads a model, places it in the scene and adopts its first camera.
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<SceneObjectId> {
        let path = path.as_ref();
        // A full scene must not leave an unreachable model in the library.
        self.check_object_space()?;
        let model = self.load_model(path)?;
        let object = self.create_scene_object(model)?;
        self.add_to_render_list(object);

        match self.models[model.0].cameras.first() {
            Some(camera) => {
                self.camera = *camera;
                info!("Using camera from '{}'", path.display());
            }
            None => warn!(
                "'{}' contains no cameras, keeping the default camera",
                path.display()
            ),
        }

        Ok(object)
    }

    pub fn create_scene_object(&mut self, model: ModelId) -> Result<SceneObjectId> {
        if model.0 >= self.models.len() {
            return Err(LanternError::UnknownModel(model.0));
        }
        self.push_object(SceneObject::with_model(model))
    }

    pub fn create_scene_object_from_shape(&mut self, name: &str) -> Result<SceneObjectId> {
        let model = *self
            .basic_shapes
            .get(name)
            .ok_or_else(|| LanternError::UnknownBasicShape(name.to_owned()))?;
        self.push_object(SceneObject::with_model(model))
    }

    /// Creates an object with no model attached yet.
    pub fn create_empty_scene_object(&mut self) -> Result<SceneObjectId> {
        self.push_object(SceneObject::new())
    }

    fn check_object_space(&self) -> Result<()> {
        if self.objects.len() >= MAX_SCENE_OBJECTS {
            return Err(LanternError::SceneFull(MAX_SCENE_OBJECTS));
        }
        Ok(())
    }

    fn push_object(&mut self, object: SceneObject) -> Result<SceneObjectId> {
        self.check_object_space()?;
        self.objects.push(object);
        Ok(SceneObjectId(self.objects.len() - 1))
    }

    /// A large grey floor made from the basic square.
    pub fn initialize_default(&mut self) -> Result<SceneObjectId> {
        let id = self.create_scene_object_from_shape("square")?;
        self.add_to_render_list(id);

        let floor = &mut self.objects[id.0];
        floor.set_rotation(-90.0, 0.0, 0.0);
        floor.set_scale(1000.0);
        floor.set_flat_color([0.5, 0.5, 0.5, 1.0]);

        Ok(id)
    }

    pub fn add_to_render_list(&mut self, id: SceneObjectId) {
        if !self.render_list.contains(&id) {
            self.render_list.push(id);
        }
    }

    pub fn remove_from_render_list(&mut self, id: SceneObjectId) -> bool {
        match self.render_list.iter().position(|o| *o == id) {
            Some(index) => {
                self.render_list.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn render_list(&self) -> &[SceneObjectId] {
        &self.render_list
    }

    pub fn object(&self, id: SceneObjectId) -> Result<&SceneObject> {
        self.objects
            .get(id.0)
            .ok_or(LanternError::UnknownSceneObject(id.0))
    }

    pub fn object_mut(&mut self, id: SceneObjectId) -> Result<&mut SceneObject> {
        self.objects
            .get_mut(id.0)
            .ok_or(LanternError::UnknownSceneObject(id.0))
    }

    pub fn model(&self, id: ModelId) -> Result<&ModelData> {
        self.models
            .get(id.0)
            .ok_or(LanternError::UnknownModel(id.0))
    }

    pub fn basic_shape(&self, name: &str) -> Option<ModelId> {
        self.basic_shapes.get(name).copied()
    }

    /// Render-list objects paired with their models, in draw order.
    pub fn renderable_objects(&self) -> impl Iterator<Item = (SceneObjectId, &SceneObject, ModelId)> + '_ {
        self.render_list.iter().filter_map(|id| {
            let object = self.objects.get(id.0)?;
            Some((*id, object, object.model()?))
        })
    }

    pub fn add_dir_light(&mut self, light: DirectionalLight) {
        self.dir_lights.push(light);
    }

    pub fn add_point_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    pub fn add_spot_light(&mut self, light: SpotLight) {
        self.spot_lights.push(light);
    }

    pub fn clear_lights(&mut self) {
        self.dir_lights.clear();
        self.point_lights.clear();
        self.spot_lights.clear();
    }

    pub fn dir_lights(&self) -> &[DirectionalLight] {
        self.lights_of(&self.dir_lights, |model| &model.dir_lights)
    }

    pub fn point_lights(&self) -> &[PointLight] {
        self.lights_of(&self.point_lights, |model| &model.point_lights)
    }

    pub fn spot_lights(&self) -> &[SpotLight] {
        self.lights_of(&self.spot_lights, |model| &model.spot_lights)
    }

    /// Scene lights win; otherwise the first rendered model carrying lights of that kind.
    fn lights_of<'a, T>(
        &'a self,
        scene_lights: &'a [T],
        from_model: impl Fn(&'a ModelData) -> &'a Vec<T>,
    ) -> &'a [T] {
        if !scene_lights.is_empty() {
            return scene_lights;
        }

        self.renderable_objects()
            .filter_map(|(_, _, model)| self.models.get(model.0))
            .map(from_model)
            .find(|lights| !lights.is_empty())
            .map(|lights| lights.as_slice())
            .unwrap_or(&[])
    }

    /// Moves the camera. `target` is a view direction.
    pub fn set_camera(&mut self, position: Vector3<f32>, target: Vector3<f32>) {
        self.camera.set_position(position);
        self.camera.set_target(target);
    }

    pub fn camera(&self) -> &BasicCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut BasicCamera {
        &mut self.camera
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.window_width = width;
        self.window_height = height;
        self.camera.resize_projection(width, height);
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn statistics(&self) -> SceneStatistics {
        SceneStatistics {
            objects: self.objects.len(),
            render_list: self.render_list.len(),
            models: self.models.len(),
            vertices: self.models.iter().map(ModelData::vertex_count).sum(),
            triangles: self.models.iter().map(ModelData::triangle_count).sum(),
        }
    }
}

fn default_camera(width: u32, height: u32) -> BasicCamera {
    let projection = PersProjInfo {
        fov_degrees: DEFAULT_FOV_DEGREES,
        width: width as f32,
        height: height as f32,
        z_near: DEFAULT_Z_NEAR,
        z_far: DEFAULT_Z_FAR,
    };

    BasicCamera::new(
        projection,
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 1.0, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::lighting::{BaseLight, LightAttenuation};
    use cgmath::InnerSpace;

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("assets/models")
            .join(name)
    }

    fn point_light(x: f32) -> PointLight {
        PointLight::new(
            BaseLight::new(Vector3::new(1.0, 1.0, 1.0), 0.1, 1.0),
            Vector3::new(x, 0.0, 0.0),
            LightAttenuation::default(),
        )
    }

    #[test]
    fn test_new_scene_defaults() {
        let scene = Scene::new(800, 600, true);
        assert!(scene.clear_frame);
        assert_eq!(scene.clear_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(scene.camera().position(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(scene.camera().target(), Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(scene.camera().projection().fov_degrees, 45.0);
        assert_eq!(scene.camera().projection().z_far, 1000.0);

        for name in ["square", "cube", "sphere"] {
            assert!(scene.basic_shape(name).is_some(), "missing {name}");
        }
        assert_eq!(scene.statistics().models, 3);
    }

    #[test]
    fn test_without_basic_shapes() {
        let mut scene = Scene::new(800, 600, false);
        assert_eq!(scene.statistics().models, 0);
        assert!(matches!(
            scene.create_scene_object_from_shape("cube"),
            Err(LanternError::UnknownBasicShape(name)) if name == "cube"
        ));
    }

    #[test]
    fn test_create_scene_object_unknown_model() {
        let mut scene = Scene::new(800, 600, false);
        assert!(matches!(
            scene.create_scene_object(ModelId(7)),
            Err(LanternError::UnknownModel(7))
        ));
    }

    #[test]
    fn test_scene_capacity() {
        let mut scene = Scene::new(800, 600, true);
        for _ in 0..MAX_SCENE_OBJECTS {
            scene.create_scene_object_from_shape("cube").unwrap();
        }

        assert!(matches!(
            scene.create_scene_object_from_shape("cube"),
            Err(LanternError::SceneFull(MAX_SCENE_OBJECTS))
        ));
        let cube = scene.basic_shape("cube").unwrap();
        assert!(matches!(
            scene.create_scene_object(cube),
            Err(LanternError::SceneFull(_))
        ));
    }

    #[test]
    fn test_render_list_has_no_duplicates() {
        let mut scene = Scene::new(800, 600, true);
        let a = scene.create_scene_object_from_shape("cube").unwrap();
        let b = scene.create_scene_object_from_shape("sphere").unwrap();

        scene.add_to_render_list(a);
        scene.add_to_render_list(b);
        scene.add_to_render_list(a);
        assert_eq!(scene.render_list(), &[a, b]);

        assert!(scene.remove_from_render_list(a));
        assert!(!scene.remove_from_render_list(a));
        assert_eq!(scene.render_list(), &[b]);
    }

    #[test]
    fn test_renderable_objects_skip_empty_objects() {
        let mut scene = Scene::new(800, 600, true);
        let empty = scene.create_empty_scene_object().unwrap();
        let cube = scene.create_scene_object_from_shape("cube").unwrap();
        scene.add_to_render_list(empty);
        scene.add_to_render_list(cube);

        let ids: Vec<_> = scene.renderable_objects().map(|(id, _, _)| id).collect();
        assert_eq!(ids, vec![cube]);
    }

    #[test]
    fn test_initialize_default() {
        let mut scene = Scene::new(800, 600, true);
        let floor = scene.initialize_default().unwrap();

        assert_eq!(scene.render_list(), &[floor]);
        let object = scene.object(floor).unwrap();
        assert_eq!(object.transform.rotation, Vector3::new(-90.0, 0.0, 0.0));
        assert_eq!(object.transform.scale, Vector3::new(1000.0, 1000.0, 1000.0));
        assert_eq!(object.flat_color, Some([0.5, 0.5, 0.5, 1.0]));
        assert_eq!(object.model(), scene.basic_shape("square"));
    }

    #[test]
    fn test_scene_lights_take_priority() {
        let mut scene = Scene::new(800, 600, true);
        assert!(scene.point_lights().is_empty());

        let mut model = ModelData::new("lamp");
        model.point_lights.push(point_light(5.0));
        let lamp = scene.add_model(model);
        let object = scene.create_scene_object(lamp).unwrap();

        // Not rendered yet, so its lights are not visible.
        assert!(scene.point_lights().is_empty());

        scene.add_to_render_list(object);
        assert_eq!(scene.point_lights().len(), 1);
        assert_eq!(scene.point_lights()[0].world_position.x, 5.0);

        scene.add_point_light(point_light(1.0));
        assert_eq!(scene.point_lights().len(), 1);
        assert_eq!(scene.point_lights()[0].world_position.x, 1.0);

        scene.clear_lights();
        assert_eq!(scene.point_lights()[0].world_position.x, 5.0);
    }

    #[test]
    fn test_load_scene_adopts_camera_and_lights() {
        let mut scene = Scene::new(800, 600, false);
        let object = scene.load_scene(fixture("lit_scene.gltf")).unwrap();

        assert_eq!(scene.render_list(), &[object]);
        let position = scene.camera().position();
        assert!((position - Vector3::new(0.0, 2.0, 10.0)).magnitude2() < 1e-6);
        assert_eq!(scene.dir_lights().len(), 1);
        assert_eq!(scene.point_lights().len(), 1);
        assert_eq!(scene.spot_lights().len(), 1);
    }

    #[test]
    fn test_load_scene_without_camera_keeps_default() {
        let mut scene = Scene::new(800, 600, false);
        scene.load_scene(fixture("cube.obj")).unwrap();
        assert_eq!(scene.camera().position(), Vector3::new(0.0, 0.0, 0.0));
        assert!(scene.dir_lights().is_empty());
    }

    #[test]
    fn test_load_scene_missing_file() {
        let mut scene = Scene::new(800, 600, false);
        assert!(scene.load_scene(fixture("missing.obj")).is_err());
        assert!(scene.render_list().is_empty());
        assert_eq!(scene.statistics().objects, 0);
    }

    #[test]
    fn test_load_scene_into_full_scene_keeps_model_library() {
        let mut scene = Scene::new(800, 600, true);
        for _ in 0..MAX_SCENE_OBJECTS {
            scene.create_scene_object_from_shape("cube").unwrap();
        }
        let models_before = scene.statistics().models;

        for _ in 0..2 {
            assert!(matches!(
                scene.load_scene(fixture("cube.obj")),
                Err(LanternError::SceneFull(MAX_SCENE_OBJECTS))
            ));
        }
        assert_eq!(scene.statistics().models, models_before);
        assert_eq!(scene.statistics().objects, MAX_SCENE_OBJECTS);
        assert!(scene.render_list().is_empty());
    }

    #[test]
    fn test_set_camera_and_resize() {
        let mut scene = Scene::new(800, 600, false);
        scene.set_camera(Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(scene.camera().position(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.camera().target(), Vector3::new(0.0, 0.0, -1.0));

        scene.resize(1024, 512);
        assert_eq!(scene.camera().projection().aspect_ratio(), 2.0);
        scene.resize(0, 512);
        assert_eq!(scene.window_size(), (1024, 512));
    }

    #[test]
    fn test_statistics() {
        let mut scene = Scene::new(800, 600, true);
        let cube = scene.create_scene_object_from_shape("cube").unwrap();
        scene.create_scene_object_from_shape("cube").unwrap();
        scene.add_to_render_list(cube);

        let stats = scene.statistics();
        assert_eq!(stats.objects, 2);
        assert_eq!(stats.render_list, 1);
        assert_eq!(stats.models, 3);
        assert!(stats.triangles >= 2 + 12);
    }
}
