use crate::graph::node::{GraphNode, RenderCtx};

/// Scales a node's output by a volume in [0, 1].
///
/// Volume changes ramp linearly across the next rendered block so slider
/// moves do not click.
pub struct GainNode<N> {
    pub signal: N,
    target: f32,
    current: f32,
}

impl<N> GainNode<N> {
    pub fn new(signal: N, volume: f32) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        Self {
            signal,
            target: volume,
            current: volume,
        }
    }

    pub fn volume(&self) -> f32 {
        self.target
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.target = volume.clamp(0.0, 1.0);
    }
}

impl<N: GraphNode> GraphNode for GainNode<N> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.signal.render_block(out, ctx);

        if out.is_empty() {
            return;
        }

        if self.current == self.target {
            for o in out.iter_mut() {
                *o *= self.target;
            }
            return;
        }

        let step = (self.target - self.current) / out.len() as f32;
        for o in out.iter_mut() {
            self.current += step;
            *o *= self.current;
        }
        self.current = self.target;
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.current = self.target;
        self.signal.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.signal.note_off(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Constant 1.0 source
    struct Dc;

    impl GraphNode for Dc {
        fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
            out.fill(1.0);
        }
    }

    #[test]
    fn steady_volume_scales_signal() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0);
        let mut node = GainNode::new(Dc, 0.25);
        let mut out = [0.0f32; 16];
        node.render_block(&mut out, &ctx);
        assert!(out.iter().all(|&s| s == 0.25));
    }

    #[test]
    fn volume_change_ramps_over_one_block() {
        let ctx = RenderCtx::from_freq(48_000.0, 440.0);
        let mut node = GainNode::new(Dc, 0.0);
        node.set_volume(1.0);

        let mut out = [0.0f32; 4];
        node.render_block(&mut out, &ctx);
        assert_eq!(out, [0.25, 0.5, 0.75, 1.0]);

        node.render_block(&mut out, &ctx);
        assert!(out.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn volume_is_clamped() {
        let mut node = GainNode::new(Dc, 3.0);
        assert_eq!(node.volume(), 1.0);
        node.set_volume(-1.0);
        assert_eq!(node.volume(), 0.0);
    }
}
