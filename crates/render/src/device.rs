//! Seams between the frame pipeline and the GPU / capture backends

use crate::vertex::Vertex;
use crate::RenderResult;
use capture_wgc::{CapturedFrame, FrameSize, FrameSource};
use geometry::Size;

/// GPU operations the frame pipeline needs.
///
/// Resources are handed back to the caller, which decides when to replace
/// them; dropping a resource releases its native handle.
pub trait RenderDevice {
    type Frame: CapturedFrame;
    type Texture;
    type VertexBuffer;
    type Surface;

    /// GPU-only texture receiving captured frames
    fn create_input_texture(&mut self, size: FrameSize) -> RenderResult<Self::Texture>;

    /// Copy `frame` into `texture`, which has the frame's size
    fn copy_frame(&mut self, frame: &Self::Frame, texture: &Self::Texture) -> RenderResult<()>;

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> RenderResult<Self::VertexBuffer>;

    /// Presentable surface bound to the host window
    fn create_surface(&mut self, size: Size) -> RenderResult<Self::Surface>;

    fn resize_surface(&mut self, surface: &mut Self::Surface, size: Size) -> RenderResult<()>;

    fn draw(
        &mut self,
        surface: &Self::Surface,
        texture: &Self::Texture,
        vertices: &Self::VertexBuffer,
        vertex_count: u32,
    ) -> RenderResult<()>;

    fn present(&mut self, surface: &Self::Surface) -> RenderResult<()>;
}

/// Opens one capture + render session at a time.
///
/// Called on the render thread each time the pipeline (re)starts; the
/// returned pair lives exactly as long as that session.
pub trait SessionBackend: Send {
    type Source: FrameSource;
    type Device: RenderDevice<Frame = <Self::Source as FrameSource>::Frame>;

    fn open(&mut self) -> RenderResult<(Self::Source, Self::Device)>;
}
