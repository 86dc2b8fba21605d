//! State orchestration for an articulated lamp product configurator.
//!
//! A renderer hands over the loaded lamp and a per-frame tick; a front end
//! sends [`configurator::Action`]s. The [`configurator::Configurator`] keeps
//! animation, materials, lighting and camera consistent in between and talks
//! back to the renderer only through [`render::Renderer`].

pub mod animation;
pub mod app;
pub mod assets;
pub mod camera;
pub mod config;
pub mod configurator;
pub mod error;
pub mod lighting;
pub mod materials;
pub mod render;
pub mod scene;

#[cfg(test)]
mod test_support;
