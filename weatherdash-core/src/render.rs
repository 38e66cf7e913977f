use log::debug;

use crate::scene::RenderPlan;

/// Realizes render plans as visual elements.
pub trait SceneRenderer {
    /// Remove every element of the current scene.
    fn clear(&mut self);

    fn render(&mut self, plan: &RenderPlan);
}

/// Owns the visible scene. Every plan fully replaces the previous one.
#[derive(Debug, Default)]
pub struct SceneView<R> {
    renderer: R,
    current: Option<RenderPlan>,
    applied: u64,
}

impl<R: SceneRenderer> SceneView<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            current: None,
            applied: 0,
        }
    }

    /// Clears the old scene, renders `plan` and makes it current.
    pub fn apply(&mut self, plan: RenderPlan) {
        self.renderer.clear();
        self.renderer.render(&plan);
        self.applied += 1;
        debug!("Applied {} scene (#{})", plan.scene.css_class(), self.applied);
        self.current = Some(plan);
    }

    pub fn current(&self) -> Option<&RenderPlan> {
        self.current.as_ref()
    }

    /// Number of plans applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }
}
