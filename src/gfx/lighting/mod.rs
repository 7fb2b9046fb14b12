//! # Lighting
//!
//! Light types and the [`PhongRenderer`], which converts camera and light
//! state into each object's local space and packs it into an
//! [`ObjectUniform`] for the Phong shader.

pub mod lights;
pub mod phong;

pub use lights::{BaseLight, DirectionalLight, LightAttenuation, PointLight, SpotLight};
pub use phong::{
    ObjectUniform, PhongRenderer, MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS, NO_CLIP_PLANE,
};
