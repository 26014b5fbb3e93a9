//! End-to-end present cycle against a real device, when one is available.
//! Runs headless: the "swapchain" is an offscreen texture. Skips quietly on
//! machines with no usable adapter (CI runners).

use scrim_core::{Color, OverlayConfig};
use scrim_renderer::{OverlayContext, SurfaceDesc};

const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn request_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::default();
    let adapter =
        pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))?;
    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None)).ok()
}

fn frame_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Fake Swapchain"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FRAME_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[test]
fn test_present_cycle() {
    let Some((device, queue)) = request_device() else {
        return;
    };

    let desc = SurfaceDesc {
        width: 64,
        height: 64,
        format: FRAME_FORMAT,
    };
    let view = frame_view(&device, desc.width, desc.height);

    let mut context = OverlayContext::new(OverlayConfig::default());
    context.register(
        Box::new(|_| Ok(())),
        Box::new(|scope| {
            scope.fill_rect(4.0, 4.0, 16.0, 16.0, Color(0xFFFF_0000));
            scope.line(0.0, 0.0, 64.0, 64.0, 1.0, Color::WHITE);
            scope.pie(32.0, 32.0, 10.0, -30.0, 120.0, Color(0x8000_FF00), true);
            Ok(())
        }),
    );

    context.pre_frame();
    context.on_present(&device, &queue, &view, &desc).unwrap();
    assert_eq!(context.surface_size(), Some((64, 64)));
    assert!(context.stats().need_repaint);

    // Second present without a script tick: blit only, no new raster work.
    context.on_present(&device, &queue, &view, &desc).unwrap();
    assert!(context.last_error().is_none());

    device.poll(wgpu::Maintain::Wait);
}

#[test]
fn test_surface_resize_rebuilds_bridge() {
    let Some((device, queue)) = request_device() else {
        return;
    };

    let mut context = OverlayContext::new(OverlayConfig::default());
    context.register(
        Box::new(|_| Ok(())),
        Box::new(|scope| {
            scope.fill_rect(0.0, 0.0, 8.0, 8.0, Color::BLUE);
            Ok(())
        }),
    );

    let small = SurfaceDesc {
        width: 32,
        height: 32,
        format: FRAME_FORMAT,
    };
    let view = frame_view(&device, small.width, small.height);
    context.pre_frame();
    context.on_present(&device, &queue, &view, &small).unwrap();
    assert_eq!(context.surface_size(), Some((32, 32)));

    let large = SurfaceDesc {
        width: 128,
        height: 128,
        format: FRAME_FORMAT,
    };
    let view = frame_view(&device, large.width, large.height);
    context.on_present(&device, &queue, &view, &large).unwrap();
    assert_eq!(context.surface_size(), Some((128, 128)));

    device.poll(wgpu::Maintain::Wait);
}
