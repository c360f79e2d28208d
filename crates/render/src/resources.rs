//! GPU resources owned by one render session
//!
//! Each wrapper holds a single native resource plus the key it was built
//! for, and only rebuilds it when the key changes.

use crate::device::RenderDevice;
use crate::vertex::{fitted_quad, QUAD_VERTEX_COUNT};
use crate::RenderResult;
use capture_wgc::{CapturedFrame, FrameSize};
use geometry::Size;
use tracing::{info, trace};

/// Texture the latest captured frame is copied into
pub struct InputTexture<T> {
    texture: T,
    size: FrameSize,
}

impl<T> InputTexture<T> {
    /// Start with a 1×1 placeholder until the first frame arrives
    pub fn new<D: RenderDevice<Texture = T>>(device: &mut D) -> RenderResult<Self> {
        let size = FrameSize::new(1, 1);
        Ok(Self {
            texture: device.create_input_texture(size)?,
            size,
        })
    }

    /// Copy `frame` in, recreating the texture first if the frame size differs
    pub fn update<D: RenderDevice<Texture = T>>(
        &mut self,
        device: &mut D,
        frame: &D::Frame,
    ) -> RenderResult<()> {
        let size = frame.size();
        if size != self.size {
            info!(from = %self.size, to = %size, "Creating input texture");
            self.texture = device.create_input_texture(size)?;
            self.size = size;
        }
        device.copy_frame(frame, &self.texture)
    }

    pub fn texture(&self) -> &T {
        &self.texture
    }

    pub fn size(&self) -> FrameSize {
        self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct VertexKey {
    image_size: (f32, f32),
    angle: f64,
}

/// Fitted quad for the current image size and angle
pub struct VertexCache<B> {
    key: Option<VertexKey>,
    buffer: Option<B>,
}

impl<B> VertexCache<B> {
    pub fn new() -> Self {
        Self {
            key: None,
            buffer: None,
        }
    }

    /// Returns whether the buffer was regenerated
    pub fn update<D: RenderDevice<VertexBuffer = B>>(
        &mut self,
        device: &mut D,
        image_size: (f64, f64),
        angle: f64,
    ) -> RenderResult<bool> {
        let key = VertexKey {
            image_size: (image_size.0 as f32, image_size.1 as f32),
            angle,
        };
        if self.key == Some(key) {
            return Ok(false);
        }

        trace!(?image_size, angle, "Generating vertex buffer");
        // Release the old buffer before building its replacement
        self.buffer = None;
        self.key = None;
        let vertices = fitted_quad(key.image_size.0, key.image_size.1, angle);
        self.buffer = Some(device.create_vertex_buffer(&vertices)?);
        self.key = Some(key);
        Ok(true)
    }

    pub fn buffer(&self) -> Option<&B> {
        self.buffer.as_ref()
    }

    pub fn count(&self) -> u32 {
        if self.buffer.is_some() {
            QUAD_VERTEX_COUNT as u32
        } else {
            0
        }
    }
}

impl<B> Default for VertexCache<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Presentable surface tracking the viewport's pixel size
pub struct SwapSurface<S> {
    surface: S,
    size: Size,
}

impl<S> SwapSurface<S> {
    pub fn new<D: RenderDevice<Surface = S>>(device: &mut D, size: Size) -> RenderResult<Self> {
        Ok(Self {
            surface: device.create_surface(size)?,
            size,
        })
    }

    /// Returns whether the surface was resized
    pub fn update<D: RenderDevice<Surface = S>>(
        &mut self,
        device: &mut D,
        size: Size,
    ) -> RenderResult<bool> {
        if size == self.size || size.is_empty() {
            return Ok(false);
        }

        trace!(width = size.width, height = size.height, "Resizing swap surface");
        device.resize_surface(&mut self.surface, size)?;
        self.size = size;
        Ok(true)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn size(&self) -> Size {
        self.size
    }
}

/// All GPU state of one render session, dropped together at teardown
pub struct ResourceSet<D: RenderDevice> {
    pub input: InputTexture<D::Texture>,
    pub vertices: VertexCache<D::VertexBuffer>,
    pub surface: SwapSurface<D::Surface>,
}

impl<D: RenderDevice> ResourceSet<D> {
    pub fn new(device: &mut D, surface_size: Size) -> RenderResult<Self> {
        Ok(Self {
            input: InputTexture::new(device)?,
            vertices: VertexCache::new(),
            surface: SwapSurface::new(device, surface_size)?,
        })
    }

    /// Draw the input texture through the current quad. A no-op before the
    /// first vertex update.
    pub fn draw(&self, device: &mut D) -> RenderResult<()> {
        match self.vertices.buffer() {
            Some(buffer) => device.draw(
                self.surface.surface(),
                self.input.texture(),
                buffer,
                self.vertices.count(),
            ),
            None => Ok(()),
        }
    }

    pub fn present(&self, device: &mut D) -> RenderResult<()> {
        device.present(self.surface.surface())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::vertex::Vertex;

    pub(crate) struct FakeFrame(pub FrameSize);

    impl CapturedFrame for FakeFrame {
        fn size(&self) -> FrameSize {
            self.0
        }
    }

    /// Counts every GPU call instead of making it
    #[derive(Default)]
    pub(crate) struct CountingDevice {
        pub textures: Vec<FrameSize>,
        pub copies: usize,
        pub vertex_buffers: usize,
        pub surfaces: usize,
        pub resizes: Vec<Size>,
        pub draws: usize,
        pub presents: usize,
    }

    impl RenderDevice for CountingDevice {
        type Frame = FakeFrame;
        type Texture = FrameSize;
        type VertexBuffer = Vec<Vertex>;
        type Surface = Size;

        fn create_input_texture(&mut self, size: FrameSize) -> RenderResult<FrameSize> {
            self.textures.push(size);
            Ok(size)
        }

        fn copy_frame(&mut self, frame: &FakeFrame, texture: &FrameSize) -> RenderResult<()> {
            assert_eq!(frame.0, *texture);
            self.copies += 1;
            Ok(())
        }

        fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> RenderResult<Vec<Vertex>> {
            self.vertex_buffers += 1;
            Ok(vertices.to_vec())
        }

        fn create_surface(&mut self, size: Size) -> RenderResult<Size> {
            self.surfaces += 1;
            Ok(size)
        }

        fn resize_surface(&mut self, surface: &mut Size, size: Size) -> RenderResult<()> {
            *surface = size;
            self.resizes.push(size);
            Ok(())
        }

        fn draw(
            &mut self,
            _surface: &Size,
            _texture: &FrameSize,
            vertices: &Vec<Vertex>,
            vertex_count: u32,
        ) -> RenderResult<()> {
            assert_eq!(vertices.len(), vertex_count as usize);
            self.draws += 1;
            Ok(())
        }

        fn present(&mut self, _surface: &Size) -> RenderResult<()> {
            self.presents += 1;
            Ok(())
        }
    }

    #[test]
    fn input_texture_recreated_only_on_size_change() {
        let mut device = CountingDevice::default();
        let mut input = InputTexture::new(&mut device).unwrap();

        input.update(&mut device, &FakeFrame(FrameSize::new(640, 480))).unwrap();
        input.update(&mut device, &FakeFrame(FrameSize::new(640, 480))).unwrap();
        input.update(&mut device, &FakeFrame(FrameSize::new(800, 600))).unwrap();

        assert_eq!(
            device.textures,
            vec![FrameSize::new(1, 1), FrameSize::new(640, 480), FrameSize::new(800, 600)]
        );
        assert_eq!(device.copies, 3);
        assert_eq!(input.size(), FrameSize::new(800, 600));
    }

    #[test]
    fn vertex_cache_keyed_on_size_and_angle() {
        let mut device = CountingDevice::default();
        let mut cache = VertexCache::new();
        assert_eq!(cache.count(), 0);

        assert!(cache.update(&mut device, (400.0, 300.0), 0.0).unwrap());
        assert!(!cache.update(&mut device, (400.0, 300.0), 0.0).unwrap());
        assert!(cache.update(&mut device, (400.0, 300.0), 15.0).unwrap());
        assert!(cache.update(&mut device, (401.0, 300.0), 15.0).unwrap());

        assert_eq!(device.vertex_buffers, 3);
        assert_eq!(cache.count(), 6);
    }

    #[test]
    fn surface_resized_only_on_size_change() {
        let mut device = CountingDevice::default();
        let mut surface = SwapSurface::new(&mut device, Size::new(400, 300)).unwrap();

        assert!(!surface.update(&mut device, Size::new(400, 300)).unwrap());
        assert!(surface.update(&mut device, Size::new(300, 400)).unwrap());
        assert!(!surface.update(&mut device, Size::new(0, 400)).unwrap());

        assert_eq!(device.resizes, vec![Size::new(300, 400)]);
        assert_eq!(*surface.surface(), Size::new(300, 400));
    }

    #[test]
    fn draw_waits_for_vertices() {
        let mut device = CountingDevice::default();
        let mut resources = ResourceSet::new(&mut device, Size::new(400, 300)).unwrap();

        resources.draw(&mut device).unwrap();
        assert_eq!(device.draws, 0);

        resources.vertices.update(&mut device, (400.0, 300.0), 0.0).unwrap();
        resources.draw(&mut device).unwrap();
        resources.present(&mut device).unwrap();
        assert_eq!((device.draws, device.presents), (1, 1));
    }
}
