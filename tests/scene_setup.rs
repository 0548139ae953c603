use std::path::Path;

use garden_scene::render::RecordingDevice;
use garden_scene::{SceneComposer, SceneError, Shape, TextureHandle};
use image::{GrayImage, Luma, Rgb, RgbImage};
use tempfile::TempDir;

fn write_rgb(dir: &Path, name: &str, width: u32, height: u32) {
    RgbImage::from_pixel(width, height, Rgb([90, 160, 70]))
        .save(dir.join(name))
        .expect("write texture");
}

fn garden_textures() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rgb(dir.path(), "leaves1.jpg", 16, 8);
    write_rgb(dir.path(), "leaves2.jpg", 8, 8);
    write_rgb(dir.path(), "gravel1.jpg", 4, 4);
    dir
}

#[test]
fn prepares_scene_from_disk() {
    let dir = garden_textures();
    let mut device = RecordingDevice::new();
    let mut scene = SceneComposer::new(dir.path());
    scene.prepare_scene(&mut device).expect("scene prepared");

    let tags: Vec<_> = scene
        .textures()
        .entries()
        .iter()
        .map(|entry| entry.tag.as_str())
        .collect();
    assert_eq!(tags, ["Leaves1", "Leaves2", "Gravel1"]);
    assert_eq!(scene.textures().find_slot("Gravel1"), Some(2));
    assert_eq!(scene.textures().find_handle("Bark"), None);

    let uploads = device.uploads();
    assert_eq!(uploads.len(), 3);
    assert_eq!((uploads[0].width, uploads[0].height), (16, 8));
    assert!(uploads.iter().all(|upload| upload.channels == 3));
    assert_eq!(
        device.bound_units(),
        vec![
            (0, TextureHandle(1)),
            (1, TextureHandle(2)),
            (2, TextureHandle(3)),
        ]
    );

    assert_eq!(scene.materials().len(), 2);
    assert!(scene.materials().find("Foliage").is_some());
    assert!(scene.materials().find("Ground").is_some());
    assert_eq!(device.loaded_shapes(), Shape::ALL);
}

#[test]
fn missing_second_texture_stops_setup() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_rgb(dir.path(), "leaves1.jpg", 4, 4);
    write_rgb(dir.path(), "gravel1.jpg", 4, 4);

    let mut device = RecordingDevice::new();
    let mut scene = SceneComposer::new(dir.path());
    let err = scene.prepare_scene(&mut device).unwrap_err();

    assert!(matches!(
        err,
        SceneError::ImageDecode { ref path, .. } if path.ends_with("leaves2.jpg")
    ));
    assert_eq!(scene.textures().len(), 1);
    assert_eq!(scene.textures().find_slot("Leaves1"), Some(0));
    assert!(scene.materials().is_empty());
    assert!(device.loaded_shapes().is_empty());
    assert!(device.bound_units().is_empty());
}

#[test]
fn grayscale_texture_is_rejected() {
    let dir = garden_textures();
    GrayImage::from_pixel(4, 4, Luma([128]))
        .save(dir.path().join("leaves1.jpg"))
        .expect("write gray texture");

    let mut device = RecordingDevice::new();
    let mut scene = SceneComposer::new(dir.path());
    let err = scene.prepare_scene(&mut device).unwrap_err();

    assert!(matches!(
        err,
        SceneError::UnsupportedChannelLayout { channels: 1, .. }
    ));
    assert!(scene.textures().is_empty());
    assert!(device.uploads().is_empty());
}

#[test]
fn frames_draw_the_whole_garden_and_release_cleanly() {
    let dir = garden_textures();
    let mut device = RecordingDevice::new();
    let mut scene = SceneComposer::new(dir.path());
    scene.prepare_scene(&mut device).expect("scene prepared");

    scene.render_scene(&mut device, false);
    let perspective = device.take_draws();
    assert_eq!(perspective.len(), 16);
    assert_eq!(perspective[0].shape, Shape::Plane);
    assert_eq!(perspective[0].uniforms.object_texture, 2);
    assert!(perspective.iter().all(|draw| draw.loaded && draw.program_active));

    scene.render_scene(&mut device, true);
    let overview = device.take_draws();
    assert_eq!(overview.len(), 15);
    assert!(overview.iter().all(|draw| draw.shape != Shape::Plane));

    scene.release_textures(&mut device);
    assert!(scene.textures().is_empty());
    assert_eq!(device.released().len(), 3);
    assert!(device.bound_units().is_empty());
}
