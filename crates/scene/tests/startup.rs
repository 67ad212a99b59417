//! Start-up sequence against an on-disk asset root: load matcaps and the
//! font in the background, poll like the frame loop does, then populate.

use std::path::Path;
use std::time::{Duration, Instant};
use textscene_assets::paths::{FONT_PATH, MATCAP_COUNT, matcap_path, resolve};
use textscene_assets::{FontLoader, LoadStatus, RgbaImage, TextureLoader};
use textscene_common::TextureKey;
use textscene_scene::{PerspectiveCamera, Scene, populate};

const FONT: &str = r#"{
    "familyName": "Fixture",
    "resolution": 1000,
    "boundingBox": { "xMin": 0, "xMax": 700, "yMin": -200, "yMax": 800 },
    "underlineThickness": 50,
    "glyphs": {
        "?": { "ha": 600, "o": "m 0 0 l 500 0 l 500 700 l 0 700 z" },
        "e": { "ha": 550,
               "o": "m 0 0 l 450 0 q 450 500 500 250 l 0 500 z m 100 100 l 100 400 l 350 400 l 350 100 z" },
        " ": { "ha": 250 }
    }
}"#;

fn write_assets(root: &Path, with_font: bool) {
    let matcaps = root.join("textures/matcaps");
    std::fs::create_dir_all(&matcaps).unwrap();
    for key in 1..=MATCAP_COUNT {
        let image = RgbaImage::from_pixel(4, 4, image_pixel(key));
        image.save(resolve(root, &matcap_path(key))).unwrap();
    }
    if with_font {
        let font_path = resolve(root, FONT_PATH);
        std::fs::create_dir_all(font_path.parent().unwrap()).unwrap();
        std::fs::write(font_path, FONT).unwrap();
    }
}

fn image_pixel(key: u32) -> textscene_assets::Rgba<u8> {
    textscene_assets::Rgba([key as u8 * 30, 128, 255 - key as u8 * 30, 255])
}

fn start_textures(root: &Path) -> TextureLoader {
    let mut textures = TextureLoader::new();
    for key in 1..=MATCAP_COUNT {
        textures.load(TextureKey(key), resolve(root, &matcap_path(key)));
    }
    textures
}

#[test]
fn font_completion_populates_scene() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path(), true);

    let mut textures = start_textures(dir.path());
    let mut pending = FontLoader::new().load(resolve(dir.path(), FONT_PATH));
    let mut scene = Scene::new(PerspectiveCamera::default());
    let mut rng = rand::rng();

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut populated = None;
    let mut completions = 0;
    while Instant::now() < deadline {
        textures.poll();
        if let Some(result) = pending.poll() {
            completions += 1;
            let font = result.unwrap();
            populated = Some(populate(&mut scene, &font, &mut rng).unwrap());
        }
        if populated.is_some() && textures.pending_count() == 0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    // The completion is delivered once and never again.
    assert!(pending.poll().is_none());
    assert_eq!(completions, 1);
    assert_eq!(pending.status(), &LoadStatus::Loaded);

    let populated = populated.expect("font never completed");
    assert_eq!(scene.renderable_count(), 102);
    assert_eq!(scene.mesh_count(), 101);
    assert_eq!(scene.line_count(), 1);
    assert_eq!(scene.camera_count(), 1);
    assert_eq!(scene.mesh_matcap(populated.text), Some(TextureKey(1)));

    for key in 1..=MATCAP_COUNT {
        let entry = textures.get(TextureKey(key)).unwrap();
        assert_eq!(entry.status, LoadStatus::Loaded);
        assert_eq!(entry.image.as_ref().unwrap().get_pixel(0, 0), &image_pixel(key));
    }
}

#[test]
fn missing_font_leaves_scene_empty() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path(), false);

    let mut pending = FontLoader::new().load(resolve(dir.path(), FONT_PATH));
    let scene = Scene::new(PerspectiveCamera::default());

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut outcome = None;
    while outcome.is_none() && Instant::now() < deadline {
        outcome = pending.poll();
        std::thread::sleep(Duration::from_millis(5));
    }

    assert!(outcome.expect("load never finished").is_err());
    assert!(matches!(pending.status(), LoadStatus::Failed(_)));
    assert_eq!(scene.renderable_count(), 0);
    assert_eq!(scene.camera_count(), 1);
}
