mod common;

use std::rc::Rc;

use glam::{
  Vec2,
  Vec3,
  Vec4,
};
use teo_renderer::prelude::*;

use common::*;

fn setup() -> (Rc<TeoHeadlessApi>, TeoGltfLoader) {
  let api = Rc::new(TeoHeadlessApi::new());
  let loader = TeoGltfLoader::new(api.clone());
  (api, loader)
}

#[test]
fn missing_indices_are_sequential() {
  let dir = temp_dir("sequential");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&QUAD);
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], None, None, MODE_TRIANGLES)]);
  let path = builder.write_gltf(&dir, "quad");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  assert_eq!(model.mesh_count(), 1);

  let mesh = &model.meshes()[0];
  let vertices = uploaded_vertices(&api, mesh);
  assert_eq!(vertices.len(), 4);
  assert_eq!(uploaded_indices(&api, mesh), vec![0, 1, 2, 3]);
  assert_eq!(mesh.index_count(), 4);
  for (vertex, position) in vertices.iter().zip(QUAD.iter()) {
    assert_eq!(vertex.position, Vec3::from_array(*position));
  }
}

#[test]
fn missing_normals_and_tex_coords_get_defaults() {
  let dir = temp_dir("defaults");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  let indices = builder.indices_u16(&[0, 1, 2]);
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], Some(indices), None, MODE_TRIANGLES)]);
  let path = builder.write_gltf(&dir, "bare");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  let vertices = uploaded_vertices(&api, &model.meshes()[0]);
  assert_eq!(vertices.len(), 3);
  for vertex in vertices.iter() {
    assert_eq!(vertex.normal, Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(vertex.tex_coord, Vec2::new(0.0, 0.0));
  }
}

#[test]
fn provided_attributes_are_kept() {
  let dir = temp_dir("attributes");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  let normals = builder.normals(&[[0.0, 0.0, 1.0]; 3]);
  let tex_coords = builder.tex_coords(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
  builder.mesh(vec![GltfBuilder::primitive(
    &[("POSITION", positions), ("NORMAL", normals), ("TEXCOORD_0", tex_coords)],
    None,
    None,
    MODE_TRIANGLES,
  )]);
  let path = builder.write_gltf(&dir, "attributes");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  let vertices = uploaded_vertices(&api, &model.meshes()[0]);
  assert!(vertices.iter().all(|v| v.normal == Vec3::Z));
  assert_eq!(vertices[1].tex_coord, Vec2::new(1.0, 0.0));
  assert_eq!(vertices[2].tex_coord, Vec2::new(0.0, 1.0));
}

#[test]
fn indices_are_widened_for_every_unsigned_type() {
  let dir = temp_dir("widening");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&QUAD);
  let u8_indices = builder.indices_u8(&[0, 1, 2, 2, 3, 0]);
  let u16_indices = builder.indices_u16(&[3, 2, 1, 1, 0, 3]);
  let u32_indices = builder.indices_u32(&[2, 3, 0]);
  builder.mesh(vec![
    GltfBuilder::primitive(&[("POSITION", positions)], Some(u8_indices), None, MODE_TRIANGLES),
    GltfBuilder::primitive(&[("POSITION", positions)], Some(u16_indices), None, MODE_TRIANGLES),
    GltfBuilder::primitive(&[("POSITION", positions)], Some(u32_indices), None, MODE_TRIANGLES),
  ]);
  let path = builder.write_gltf(&dir, "widening");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  assert_eq!(model.mesh_count(), 3);
  assert_eq!(uploaded_indices(&api, &model.meshes()[0]), vec![0, 1, 2, 2, 3, 0]);
  assert_eq!(uploaded_indices(&api, &model.meshes()[1]), vec![3, 2, 1, 1, 0, 3]);
  assert_eq!(uploaded_indices(&api, &model.meshes()[2]), vec![2, 3, 0]);
}

#[test]
fn texture_is_shared_within_one_load() {
  let dir = temp_dir("shared");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  let image = builder.embedded_image(&png_bytes(2, 2, [255, 0, 0, 255]));
  let texture = builder.texture(image);
  let red = builder.material([1.0, 0.5, 0.5, 1.0], Some(texture));
  let blue = builder.material([0.5, 0.5, 1.0, 1.0], Some(texture));
  builder.mesh(vec![
    GltfBuilder::primitive(&[("POSITION", positions)], None, Some(red), MODE_TRIANGLES),
    GltfBuilder::primitive(&[("POSITION", positions)], None, Some(blue), MODE_TRIANGLES),
  ]);
  let path = builder.write_gltf(&dir, "shared");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  let first = model.meshes()[0].material().base_color_texture.clone().unwrap();
  let second = model.meshes()[1].material().base_color_texture.clone().unwrap();
  assert!(Rc::ptr_eq(&first, &second));
  assert_eq!(api.texture_uploads(), 1);
  assert_eq!(api.live_textures(), 1);
  // Two materials plus the two clones above.
  assert_eq!(Rc::strong_count(&first), 4);
  assert_eq!((first.width(), first.height()), (2, 2));

  assert_eq!(model.meshes()[0].material().base_color_factor, Vec4::new(1.0, 0.5, 0.5, 1.0));
  assert_eq!(model.meshes()[1].material().base_color_factor, Vec4::new(0.5, 0.5, 1.0, 1.0));
}

#[test]
fn textures_are_not_shared_across_loads() {
  let dir = temp_dir("per-load");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  let image = builder.embedded_image(&png_bytes(1, 1, [0, 255, 0, 255]));
  let texture = builder.texture(image);
  let material = builder.material([1.0; 4], Some(texture));
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], None, Some(material), MODE_TRIANGLES)]);
  let path = builder.write_gltf(&dir, "per_load");

  let (api, mut loader) = setup();
  let first = loader.load(&path).unwrap();
  let second = loader.load(&path).unwrap();
  let first_texture = first.meshes()[0].material().base_color_texture.clone().unwrap();
  let second_texture = second.meshes()[0].material().base_color_texture.clone().unwrap();
  assert!(!Rc::ptr_eq(&first_texture, &second_texture));
  assert_eq!(api.texture_uploads(), 2);

  drop(first_texture);
  drop(first);
  assert_eq!(api.live_textures(), 1);
}

#[test]
fn document_without_meshes_is_an_empty_model() {
  let dir = temp_dir("empty");
  let path = GltfBuilder::new().write_gltf(&dir, "nothing");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  assert!(model.is_empty());
  assert_eq!(model.name, "nothing");
  assert_eq!(api.live_resources(), 0);
}

#[test]
fn unreadable_files_yield_no_model() {
  let dir = temp_dir("unreadable");
  let broken = dir.join("broken.gltf");
  std::fs::write(&broken, "{ this is not json").unwrap();

  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], None, None, MODE_TRIANGLES)]);
  let good = builder.write_gltf(&dir, "good");

  let (api, mut loader) = setup();
  assert!(loader.load(dir.join("does_not_exist.gltf")).is_none());
  assert!(loader.load(&broken).is_none());
  assert!(loader.try_load(&broken).is_err());
  assert_eq!(api.live_resources(), 0);

  let model = loader.load(&good).unwrap();
  assert_eq!(model.mesh_count(), 1);
}

#[test]
fn scene_keeps_loading_after_failures() {
  let dir = temp_dir("batch");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], None, None, MODE_TRIANGLES)]);
  let first = builder.write_gltf(&dir, "first");
  let second = builder.write_glb(&dir, "second");

  let (_api, mut loader) = setup();
  let mut scene = TeoScene::new();
  let paths = vec![dir.join("missing.gltf"), first, dir.join("missing.glb"), second];
  assert_eq!(scene.load_files(&mut loader, &paths), 2);
  let names: Vec<&str> = scene.models().iter().map(|model| model.name.as_str()).collect();
  assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn non_triangle_primitives_are_skipped() {
  let dir = temp_dir("topology");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&QUAD);
  builder.mesh(vec![
    GltfBuilder::primitive(&[("POSITION", positions)], None, None, MODE_LINES),
    GltfBuilder::primitive(&[("POSITION", positions)], None, None, MODE_TRIANGLES),
  ]);
  let path = builder.write_gltf(&dir, "topology");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  assert_eq!(model.mesh_count(), 1);
  assert_eq!(api.live_vertex_arrays(), 1);
}

#[test]
fn unusable_positions_give_an_empty_mesh() {
  let dir = temp_dir("no-positions");
  let mut builder = GltfBuilder::new();
  let missing = builder.positions_without_view(3);
  let positions = builder.positions(&TRIANGLE);
  builder.mesh(vec![
    GltfBuilder::primitive(&[("POSITION", missing)], None, None, MODE_TRIANGLES),
    GltfBuilder::primitive(&[("POSITION", positions)], None, None, MODE_TRIANGLES),
  ]);
  let path = builder.write_gltf(&dir, "no_positions");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  assert_eq!(model.mesh_count(), 2);
  assert_eq!(model.meshes()[0].index_count(), 0);
  assert!(uploaded_vertices(&api, &model.meshes()[0]).is_empty());
  assert_eq!(model.meshes()[1].index_count(), 3);
}

#[test]
fn primitive_without_position_attribute_is_empty() {
  let dir = temp_dir("no-position-key");
  let mut builder = GltfBuilder::new();
  let normals = builder.normals(&[[0.0, 0.0, 1.0]; 3]);
  let positions = builder.positions(&TRIANGLE);
  builder.mesh(vec![
    GltfBuilder::primitive(&[("NORMAL", normals)], None, None, MODE_TRIANGLES),
    GltfBuilder::primitive(&[("POSITION", positions)], None, None, MODE_TRIANGLES),
  ]);
  let path = builder.write_gltf(&dir, "normals_only");

  let (_api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  let counts: Vec<u32> = model.meshes().iter().map(|mesh| mesh.index_count()).collect();
  assert_eq!(counts, vec![0, 3]);
}

#[test]
fn positions_without_bounds_still_load() {
  let dir = temp_dir("no-bounds");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions_without_bounds(&TRIANGLE);
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], None, None, MODE_TRIANGLES)]);
  let path = builder.write_glb(&dir, "unbounded");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  assert_eq!(model.meshes()[0].index_count(), 3);
  let vertices = uploaded_vertices(&api, &model.meshes()[0]);
  assert_eq!(vertices[1].position, Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn out_of_range_position_accessor_fails_the_file() {
  let dir = temp_dir("bad-position-index");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions + 7)], None, None, MODE_TRIANGLES)]);
  let path = builder.write_gltf(&dir, "dangling");

  let (api, mut loader) = setup();
  assert!(loader.load(&path).is_none());
  assert_eq!(api.live_resources(), 0);
}

#[test]
fn image_without_a_source_leaves_the_material_untextured() {
  let dir = temp_dir("sourceless-image");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  let image = builder.raw_image(serde_json::json!({}));
  let texture = builder.texture(image);
  let material = builder.material([0.5, 0.25, 1.0, 1.0], Some(texture));
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], None, Some(material), MODE_TRIANGLES)]);
  let path = builder.write_gltf(&dir, "sourceless");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  let material = model.meshes()[0].material();
  assert!(material.base_color_texture.is_none());
  assert!(!material.has_texture());
  assert_eq!(material.base_color_factor, Vec4::new(0.5, 0.25, 1.0, 1.0));
  assert_eq!(model.meshes()[0].index_count(), 3);
  assert_eq!(api.texture_uploads(), 0);
}

#[test]
fn embedded_image_without_mime_type_is_decoded_by_content() {
  let dir = temp_dir("no-mime-type");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  let image = builder.embedded_image_without_mime_type(&png_bytes(2, 3, [200, 100, 50, 255]));
  let texture = builder.texture(image);
  let material = builder.material([1.0; 4], Some(texture));
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], None, Some(material), MODE_TRIANGLES)]);
  let path = builder.write_glb(&dir, "untyped");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  let texture = model.meshes()[0].material().base_color_texture.clone().unwrap();
  assert_eq!((texture.width(), texture.height()), (2, 3));
  assert_eq!(api.texture_uploads(), 1);
}

#[test]
fn glb_matches_gltf() {
  let dir = temp_dir("glb");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&QUAD);
  let indices = builder.indices_u16(&[0, 1, 2, 2, 3, 0]);
  let image = builder.embedded_image(&png_bytes(4, 2, [10, 20, 30, 255]));
  let texture = builder.texture(image);
  let material = builder.material([1.0; 4], Some(texture));
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], Some(indices), Some(material), MODE_TRIANGLES)]);
  let gltf_path = builder.write_gltf(&dir, "text");
  let glb_path = builder.write_glb(&dir, "binary");

  let (api, mut loader) = setup();
  let text = loader.load(&gltf_path).unwrap();
  let binary = loader.load(&glb_path).unwrap();
  assert_eq!(binary.name, "binary");
  assert_eq!(uploaded_indices(&api, &text.meshes()[0]), uploaded_indices(&api, &binary.meshes()[0]));
  assert_eq!(uploaded_vertices(&api, &text.meshes()[0]), uploaded_vertices(&api, &binary.meshes()[0]));
  let texture = binary.meshes()[0].material().base_color_texture.clone().unwrap();
  assert_eq!((texture.width(), texture.height()), (4, 2));
}

#[test]
fn uri_images_resolve_next_to_the_file() {
  let dir = temp_dir("uri");
  std::fs::create_dir_all(dir.join("textures")).unwrap();
  std::fs::write(dir.join("textures").join("albedo.png"), png_bytes(3, 1, [1, 2, 3, 255])).unwrap();

  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  let file_image = builder.uri_image("textures/albedo.png");
  let missing_image = builder.uri_image("textures/missing.png");
  let data_image = {
    use base64::Engine;
    let uri = format!("data:image/png;base64,{}", base64::engine::general_purpose::STANDARD.encode(png_bytes(5, 5, [9, 9, 9, 255])));
    builder.uri_image(&uri)
  };
  let file_texture = builder.texture(file_image);
  let missing_texture = builder.texture(missing_image);
  let data_texture = builder.texture(data_image);
  let file_material = builder.material([1.0; 4], Some(file_texture));
  let missing_material = builder.material([0.25, 0.5, 0.75, 1.0], Some(missing_texture));
  let data_material = builder.material([1.0; 4], Some(data_texture));
  builder.mesh(vec![
    GltfBuilder::primitive(&[("POSITION", positions)], None, Some(file_material), MODE_TRIANGLES),
    GltfBuilder::primitive(&[("POSITION", positions)], None, Some(missing_material), MODE_TRIANGLES),
    GltfBuilder::primitive(&[("POSITION", positions)], None, Some(data_material), MODE_TRIANGLES),
  ]);
  let path = builder.write_gltf(&dir, "uri");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  assert_eq!(model.mesh_count(), 3);

  let file = model.meshes()[0].material().base_color_texture.clone().unwrap();
  assert_eq!((file.width(), file.height()), (3, 1));

  let missing = model.meshes()[1].material();
  assert!(missing.base_color_texture.is_none());
  assert!(!missing.has_texture());
  assert_eq!(missing.base_color_factor, Vec4::new(0.25, 0.5, 0.75, 1.0));

  let data = model.meshes()[2].material().base_color_texture.clone().unwrap();
  assert_eq!((data.width(), data.height()), (5, 5));
  assert_eq!(api.texture_uploads(), 2);
}

#[test]
fn primitive_without_material_uses_default() {
  let dir = temp_dir("default-material");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&TRIANGLE);
  builder.mesh(vec![GltfBuilder::primitive(&[("POSITION", positions)], None, None, MODE_TRIANGLES)]);
  let path = builder.write_gltf(&dir, "plain");

  let (_api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  let material = model.meshes()[0].material();
  assert_eq!(material.base_color_factor, Vec4::ONE);
  assert!(material.base_color_texture.is_none());
}

#[test]
fn dropping_the_model_releases_everything_once() {
  let dir = temp_dir("release");
  let mut builder = GltfBuilder::new();
  let positions = builder.positions(&QUAD);
  let image = builder.embedded_image(&png_bytes(2, 2, [0, 0, 0, 255]));
  let texture = builder.texture(image);
  let material = builder.material([1.0; 4], Some(texture));
  builder.mesh(vec![
    GltfBuilder::primitive(&[("POSITION", positions)], None, Some(material), MODE_TRIANGLES),
    GltfBuilder::primitive(&[("POSITION", positions)], None, Some(material), MODE_TRIANGLES),
  ]);
  let path = builder.write_gltf(&dir, "release");

  let (api, mut loader) = setup();
  let model = loader.load(&path).unwrap();
  // 2 x (vertex array + 2 buffers) + 1 texture.
  assert_eq!(api.live_resources(), 7);

  drop(model);
  assert_eq!(api.live_resources(), 0);
  assert_eq!(api.release_count(), 7);
  assert_eq!(api.invalid_releases(), 0);
}
