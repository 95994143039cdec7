use std::path::Path;
use std::rc::Rc;

use crate::backend::TeoGraphicsApiRef;
use crate::error::TeoRendererError;
use crate::scene::gpu::{
  TeoMesh,
  TeoModel,
};

use super::geometry::decode_primitive;
use super::material_resolver::TeoMaterialResolver;

/// Whether a validation error belongs to the POSITION attribute of a primitive.
fn is_position_error(path: &gltf::json::Path) -> bool {
  let path = path.as_str();
  path.starts_with("meshes[") && path.contains(".attributes[\"POSITION\"]")
}

/// Open a `.gltf` or `.glb` file and validate it.
///
/// A primitive without a POSITION attribute, or whose POSITION accessor has
/// no bounds, does not fail the document. It is decoded as an empty mesh.
/// param path: The path of the glTF file.
/// return: The parsed file.
pub fn open_document(path: &Path) -> Result<gltf::Gltf, gltf::Error> {
  use gltf::json::validation::{
    Error as ValidationError,
    Validate,
  };

  let file = std::fs::File::open(path).map_err(gltf::Error::Io)?;
  let gltf = gltf::Gltf::from_reader_without_validation(std::io::BufReader::new(file))?;
  let root = gltf.document.as_json();

  // The POSITION bounds check indexes the accessors directly, reject bad indices first.
  for (mesh_index, mesh) in root.meshes.iter().enumerate() {
    for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
      if primitive.attributes.values().any(|accessor| accessor.value() >= root.accessors.len()) {
        let path = gltf::json::Path::new()
          .field("meshes")
          .index(mesh_index)
          .field("primitives")
          .index(primitive_index)
          .field("attributes");
        return Err(gltf::Error::Validation(vec![(path, ValidationError::IndexOutOfBounds)]));
      }
    }
  }

  let mut errors = Vec::new();
  root.validate(root, gltf::json::Path::new, &mut |path: &dyn Fn() -> gltf::json::Path, error: ValidationError| {
    let path = path();
    if is_position_error(&path) {
      log::warn!("Ignoring \"{}\" at {}, the primitive is left empty.", error, path);
    } else {
      errors.push((path, error));
    }
  });
  if !errors.is_empty() {
    return Err(gltf::Error::Validation(errors));
  }

  Ok(gltf)
}

/// The glTF loader.
///
/// Reads `.gltf` and `.glb` files and uploads their triangle primitives as
/// meshes of one model. Textures are shared between the primitives of one
/// load, never across loads.
pub struct TeoGltfLoader {
  api: TeoGraphicsApiRef,
  materials: TeoMaterialResolver,
}

/// The implementation of the glTF loader.
impl TeoGltfLoader {
  /// Create a new loader.
  /// param api: The graphics API the meshes and textures are created with.
  /// return: The loader.
  pub fn new(api: TeoGraphicsApiRef) -> Self {
    Self {
      materials: TeoMaterialResolver::new(Rc::clone(&api)),
      api,
    }
  }

  /// Load the glTF file, logging the failure.
  /// param path: The path of the glTF file.
  /// return: The model, none if the file could not be loaded.
  pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Option<TeoModel> {
    let path = path.as_ref();
    match self.try_load(path) {
      Ok(model) => Some(model),
      Err(err) => {
        match std::error::Error::source(&err) {
          Some(source) => log::error!("{} {}", err, source),
          None => log::error!("{}", err),
        }
        None
      },
    }
  }

  /// Load the glTF file.
  /// param path: The path of the glTF file.
  /// return: The model.
  pub fn try_load<P: AsRef<Path>>(&mut self, path: P) -> Result<TeoModel, TeoRendererError> {
    let path = path.as_ref();
    let base_dir = path.parent().unwrap_or(Path::new(""));

    let gltf::Gltf { document, blob } = open_document(path)
      .map_err(|err| TeoRendererError::new(&format!("Load glTF file \"{}\" failed.", path.display()), Some(Box::new(err))))?;
    let buffers = gltf::import_buffers(&document, Some(base_dir), blob)
      .map_err(|err| TeoRendererError::new(&format!("Load buffers of glTF file \"{}\" failed.", path.display()), Some(Box::new(err))))?;

    let name = path.file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_default();
    let mut model = TeoModel::new(&name);

    self.materials.clear();
    let result = self.load_meshes(&document, base_dir, &buffers, &mut model);
    self.materials.clear();
    result?;

    log::info!("Loaded glTF: {} ({} meshes)", path.display(), model.mesh_count());
    Ok(model)
  }

  fn load_meshes(
    &mut self,
    document: &gltf::Document,
    base_dir: &Path,
    buffers: &[gltf::buffer::Data],
    model: &mut TeoModel,
  ) -> Result<(), TeoRendererError> {
    for mesh in document.meshes() {
      let mesh_name = mesh.name().unwrap_or("<Unnamed>");
      log::debug!("Loading mesh \"{}\".", mesh_name);

      for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
          log::debug!("Skipping primitive {} of mesh \"{}\" with mode {:?}.", primitive.index(), mesh_name, primitive.mode());
          continue;
        }

        let geometry = decode_primitive(&primitive, buffers);
        let mut loaded_mesh = TeoMesh::new(Rc::clone(&self.api));
        loaded_mesh.setup(&geometry.vertices, &geometry.indices)?;
        loaded_mesh.set_material(self.materials.resolve(document, &primitive.material(), base_dir, buffers));
        model.add_mesh(loaded_mesh);
      }
    }
    Ok(())
  }
}
