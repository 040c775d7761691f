//! The grid-flavor capability seam.
//!
//! The three grid flavors share the extent and mask arithmetic but nothing
//! else, so instead of one abstract base the pipeline is generic over a
//! narrow capability set: build the block descriptor, decide adjacency and
//! shift the remote extent into the local frame, accumulate ghost
//! coordinates, and materialize the output grid.

use crate::algs::face_match::{fit_faces, shifted_extent_from_interface};
use crate::algs::fitting::fit_axis;
use crate::algs::peel::peel_ghost_extent;
use crate::block::info::{BlockInformation, CurvilinearInfo, ImageInfo, RectilinearInfo};
use crate::block::structure::{BlockStructure, CurvilinearExt, ImageExt, RectilinearExt};
use crate::exchange::wire::{WireReader, WireWriter};
use crate::ghost_error::GhostError;
use crate::grid::coords::float_eq;
use crate::grid::curvilinear::extract_outer_layer;
use crate::grid::extent::Extent;
use crate::grid::image::{quaternions_coincide, spacings_coincide};
use crate::grid::{CurvilinearGrid, ImageGrid, RectilinearGrid};

/// Capability set one grid flavor must provide to run through the
/// pipeline.
pub trait GridFlavor: Clone + Send + Sync + Sized + 'static {
    /// Flavor part of the per-block [`BlockInformation`].
    type InfoExt: Clone + Default + Send + Sync;
    /// Flavor part of the remote [`BlockStructure`] descriptor.
    type StructureExt: Clone + Send + Sync;

    /// Raw extent of the input grid, prior ghosts included.
    fn extent(&self) -> Extent;

    /// Peel pre-existing ghosts and capture the flavor extras
    /// (trimmed coordinates, outer point layers).
    fn build_information(
        &self,
        ghost_cell_markers: Option<&[u8]>,
        input_ghost_levels: i64,
    ) -> BlockInformation<Self::InfoExt>;

    /// The descriptor this block advertises: also the local side of every
    /// adjacency decision.
    fn local_structure(
        &self,
        info: &BlockInformation<Self::InfoExt>,
    ) -> BlockStructure<Self::StructureExt>;

    /// Serialize a descriptor for the all-to-all round.
    fn encode_structure(structure: &BlockStructure<Self::StructureExt>, w: &mut WireWriter);

    /// Inverse of [`encode_structure`](Self::encode_structure).
    fn decode_structure(
        r: &mut WireReader<'_>,
    ) -> Result<BlockStructure<Self::StructureExt>, GhostError>;

    /// Decide adjacency and re-express the remote extent in the
    /// local block's frame, or reject with `None`.
    fn shift_extent(
        local: &BlockStructure<Self::StructureExt>,
        remote: &mut BlockStructure<Self::StructureExt>,
    ) -> Option<Extent>;

    /// Per-side hook run whenever a contact grows `side`; rectilinear
    /// grids collect neighbor ticks here.
    fn accumulate_ghost_coordinates(
        info: &mut BlockInformation<Self::InfoExt>,
        side: usize,
        remote: &BlockStructure<Self::StructureExt>,
    ) {
        let _ = (info, side, remote);
    }

    /// The output grid at the widened extent.
    fn build_output_grid(
        &self,
        info: &BlockInformation<Self::InfoExt>,
        output_extent: Extent,
    ) -> Self;

    /// Components per point in the interface payload: 3 when point
    /// coordinates travel with the field data, 0 otherwise.
    fn point_components() -> usize {
        0
    }

    /// Append the coordinates of the input points at `ids` to `out`.
    fn pack_points(&self, ids: &[usize], out: &mut Vec<f64>) {
        let _ = (ids, out);
    }

    /// Write received point coordinates into the output grid at `ids`.
    fn unpack_points(
        output: &mut Self,
        ids: &[usize],
        data: &[f64],
        local: u64,
        remote: u64,
    ) -> Result<(), GhostError> {
        let _ = (output, ids);
        if data.is_empty() {
            Ok(())
        } else {
            Err(GhostError::InterfaceMismatch {
                local,
                remote,
                kind: "point coordinate",
                expected: 0,
                got: data.len(),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Image grids
// ---------------------------------------------------------------------------

impl GridFlavor for ImageGrid {
    type InfoExt = ImageInfo;
    type StructureExt = ImageExt;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn build_information(
        &self,
        ghost_cell_markers: Option<&[u8]>,
        input_ghost_levels: i64,
    ) -> BlockInformation<ImageInfo> {
        let true_extent = peel_ghost_extent(&self.extent, ghost_cell_markers, input_ghost_levels);
        BlockInformation::new(true_extent, ImageInfo)
    }

    fn local_structure(&self, info: &BlockInformation<ImageInfo>) -> BlockStructure<ImageExt> {
        BlockStructure::new(
            info.true_extent,
            info.true_extent.data_dimension(),
            ImageExt {
                origin: self.origin,
                spacing: self.spacing,
                direction: self.direction,
            },
        )
    }

    fn encode_structure(structure: &BlockStructure<ImageExt>, w: &mut WireWriter) {
        w.push_extent(&structure.extent);
        w.push_u32(structure.data_dimension as u32);
        for v in structure.ext.origin {
            w.push_f64(v);
        }
        for v in structure.ext.spacing {
            w.push_f64(v);
        }
        for v in structure.ext.direction {
            w.push_f64(v);
        }
    }

    fn decode_structure(r: &mut WireReader<'_>) -> Result<BlockStructure<ImageExt>, GhostError> {
        let extent = r.read_extent()?;
        let dim = r.read_u32()? as usize;
        let mut origin = [0.0; 3];
        for v in &mut origin {
            *v = r.read_f64()?;
        }
        let mut spacing = [0.0; 3];
        for v in &mut spacing {
            *v = r.read_f64()?;
        }
        let mut direction = [0.0; 4];
        for v in &mut direction {
            *v = r.read_f64()?;
        }
        Ok(BlockStructure::new(
            extent,
            dim,
            ImageExt {
                origin,
                spacing,
                direction,
            },
        ))
    }

    fn shift_extent(
        local: &BlockStructure<ImageExt>,
        remote: &mut BlockStructure<ImageExt>,
    ) -> Option<Extent> {
        if !remote.extent.is_valid()
            || remote.data_dimension != local.data_dimension
            || !spacings_coincide(&remote.ext.spacing, &local.ext.spacing)
            || !quaternions_coincide(&remote.ext.direction, &local.ext.direction)
        {
            return None;
        }

        // The origin offset must project onto integer lattice positions.
        let mut diff = [0i64; 3];
        for d in 0..3 {
            let offset = remote.ext.origin[d] - local.ext.origin[d];
            let steps = (offset / local.ext.spacing[d]).round();
            if !float_eq(offset, steps * local.ext.spacing[d]) {
                return None;
            }
            diff[d] = steps as i64;
        }

        Some(Extent::new([
            remote.extent[0] + diff[0],
            remote.extent[1] + diff[0],
            remote.extent[2] + diff[1],
            remote.extent[3] + diff[1],
            remote.extent[4] + diff[2],
            remote.extent[5] + diff[2],
        ]))
    }

    fn build_output_grid(&self, _info: &BlockInformation<ImageInfo>, output_extent: Extent) -> Self {
        // Points are implicit; only the extent moves.
        ImageGrid {
            extent: output_extent,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Rectilinear grids
// ---------------------------------------------------------------------------

impl GridFlavor for RectilinearGrid {
    type InfoExt = RectilinearInfo;
    type StructureExt = RectilinearExt;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn build_information(
        &self,
        ghost_cell_markers: Option<&[u8]>,
        input_ghost_levels: i64,
    ) -> BlockInformation<RectilinearInfo> {
        let raw = self.extent;
        let true_extent = peel_ghost_extent(&raw, ghost_cell_markers, input_ghost_levels);
        let slice_axis = |axis: usize| {
            let start = (true_extent[2 * axis] - raw[2 * axis]) as usize;
            let len = (true_extent[2 * axis + 1] - true_extent[2 * axis] + 1) as usize;
            self.axis(axis).sliced(start, len)
        };
        BlockInformation::new(
            true_extent,
            RectilinearInfo {
                x: slice_axis(0),
                y: slice_axis(1),
                z: slice_axis(2),
                coordinate_ghosts: Default::default(),
            },
        )
    }

    fn local_structure(
        &self,
        info: &BlockInformation<RectilinearInfo>,
    ) -> BlockStructure<RectilinearExt> {
        BlockStructure::new(
            info.true_extent,
            info.true_extent.data_dimension(),
            RectilinearExt {
                x: info.ext.x.clone(),
                y: info.ext.y.clone(),
                z: info.ext.z.clone(),
            },
        )
    }

    fn encode_structure(structure: &BlockStructure<RectilinearExt>, w: &mut WireWriter) {
        w.push_extent(&structure.extent);
        w.push_u32(structure.data_dimension as u32);
        w.push_coords(&structure.ext.x);
        w.push_coords(&structure.ext.y);
        w.push_coords(&structure.ext.z);
    }

    fn decode_structure(
        r: &mut WireReader<'_>,
    ) -> Result<BlockStructure<RectilinearExt>, GhostError> {
        let extent = r.read_extent()?;
        let dim = r.read_u32()? as usize;
        let x = r.read_coords()?;
        let y = r.read_coords()?;
        let z = r.read_coords()?;
        Ok(BlockStructure::new(extent, dim, RectilinearExt { x, y, z }))
    }

    fn shift_extent(
        local: &BlockStructure<RectilinearExt>,
        remote: &mut BlockStructure<RectilinearExt>,
    ) -> Option<Extent> {
        if !remote.extent.is_valid() || remote.data_dimension != local.data_dimension {
            return None;
        }

        let fits = [
            fit_axis(&local.ext.x, &remote.ext.x),
            fit_axis(&local.ext.y, &remote.ext.y),
            fit_axis(&local.ext.z, &remote.ext.z),
        ];
        // All three axes must fit; a zero-width fit on an axis is what
        // face, edge, and corner contacts look like.
        if fits.iter().any(|f| !f.overlaps) {
            return None;
        }

        let mut shifted = remote.extent;
        for d in 0..3 {
            let diff =
                remote.extent[2 * d] + fits[d].min_id - local.extent[2 * d] - fits[d].local_min_id;
            shifted[2 * d] -= diff;
            shifted[2 * d + 1] -= diff;
        }
        Some(shifted)
    }

    fn accumulate_ghost_coordinates(
        info: &mut BlockInformation<RectilinearInfo>,
        side: usize,
        remote: &BlockStructure<RectilinearExt>,
    ) {
        let thickness = info.ghost_thickness[side] as usize;
        let coords = remote.ext.axis(side / 2);
        let slot = &mut info.ext.coordinate_ghosts[side];
        let current = slot.as_ref().map_or(0, |c| c.len());
        if current >= thickness {
            return;
        }
        let n = thickness - current;
        let ghost = slot.get_or_insert_with(|| coords.new_like());
        if side % 2 == 0 {
            // Low side: the neighbor's last tick coincides with this
            // block's first; its preceding ticks become the pre segment.
            ghost.prepend_from(coords, coords.len() - 1 - thickness, n);
        } else {
            ghost.extend_from(coords, 1 + current, n);
        }
    }

    fn build_output_grid(
        &self,
        info: &BlockInformation<RectilinearInfo>,
        output_extent: Extent,
    ) -> Self {
        let ghosts = &info.ext.coordinate_ghosts;
        RectilinearGrid {
            extent: output_extent,
            x: info.ext.x.with_ghosts(ghosts[0].as_ref(), ghosts[1].as_ref()),
            y: info.ext.y.with_ghosts(ghosts[2].as_ref(), ghosts[3].as_ref()),
            z: info.ext.z.with_ghosts(ghosts[4].as_ref(), ghosts[5].as_ref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Curvilinear grids
// ---------------------------------------------------------------------------

impl GridFlavor for CurvilinearGrid {
    type InfoExt = CurvilinearInfo;
    type StructureExt = CurvilinearExt;

    fn extent(&self) -> Extent {
        self.extent
    }

    fn build_information(
        &self,
        ghost_cell_markers: Option<&[u8]>,
        input_ghost_levels: i64,
    ) -> BlockInformation<CurvilinearInfo> {
        let true_extent = peel_ghost_extent(&self.extent, ghost_cell_markers, input_ghost_levels);
        let outer_layers =
            std::array::from_fn(|side| extract_outer_layer(self, &true_extent, side));
        BlockInformation::new(true_extent, CurvilinearInfo { outer_layers })
    }

    fn local_structure(
        &self,
        info: &BlockInformation<CurvilinearInfo>,
    ) -> BlockStructure<CurvilinearExt> {
        BlockStructure::new(
            info.true_extent,
            info.true_extent.data_dimension(),
            CurvilinearExt {
                faces: info.ext.outer_layers.clone(),
                grid_interface: None,
            },
        )
    }

    fn encode_structure(structure: &BlockStructure<CurvilinearExt>, w: &mut WireWriter) {
        w.push_extent(&structure.extent);
        w.push_u32(structure.data_dimension as u32);
        for face in &structure.ext.faces {
            w.push_extent(&face.extent);
            w.push_points(&face.points);
        }
    }

    fn decode_structure(
        r: &mut WireReader<'_>,
    ) -> Result<BlockStructure<CurvilinearExt>, GhostError> {
        let extent = r.read_extent()?;
        let dim = r.read_u32()? as usize;
        let mut faces = Vec::with_capacity(6);
        for _ in 0..6 {
            let face_extent = r.read_extent()?;
            let points = r.read_points()?;
            faces.push(crate::grid::curvilinear::FacePatch {
                extent: face_extent,
                points,
            });
        }
        let faces: [crate::grid::curvilinear::FacePatch; 6] =
            faces.try_into().expect("exactly six faces read");
        Ok(BlockStructure::new(
            extent,
            dim,
            CurvilinearExt {
                faces,
                grid_interface: None,
            },
        ))
    }

    fn shift_extent(
        local: &BlockStructure<CurvilinearExt>,
        remote: &mut BlockStructure<CurvilinearExt>,
    ) -> Option<Extent> {
        if !remote.extent.is_valid() || remote.data_dimension != local.data_dimension {
            return None;
        }
        let fit = fit_faces(&local.ext.faces, &remote.ext.faces)?;
        let shifted = shifted_extent_from_interface(&local.extent, &remote.extent, &fit);
        remote.ext.grid_interface = Some(fit.remote);
        Some(shifted)
    }

    fn build_output_grid(
        &self,
        info: &BlockInformation<CurvilinearInfo>,
        output_extent: Extent,
    ) -> Self {
        // Copy the true-extent points to their new offsets; ghost points
        // arrive with the field exchange.
        let mut points = vec![[0.0f64; 3]; output_extent.num_points()];
        let te = &info.true_extent;
        for k in te[4]..=te[5] {
            for j in te[2]..=te[3] {
                for i in te[0]..=te[1] {
                    let ijk = [i, j, k];
                    points[output_extent.point_id(ijk)] = self.point(ijk);
                }
            }
        }
        CurvilinearGrid {
            extent: output_extent,
            points,
        }
    }

    fn point_components() -> usize {
        3
    }

    fn pack_points(&self, ids: &[usize], out: &mut Vec<f64>) {
        for &id in ids {
            out.extend_from_slice(&self.points[id]);
        }
    }

    fn unpack_points(
        output: &mut Self,
        ids: &[usize],
        data: &[f64],
        local: u64,
        remote: u64,
    ) -> Result<(), GhostError> {
        if data.len() != ids.len() * 3 {
            return Err(GhostError::InterfaceMismatch {
                local,
                remote,
                kind: "point coordinate",
                expected: ids.len() * 3,
                got: data.len(),
            });
        }
        for (n, &id) in ids.iter().enumerate() {
            output.points[id] = [data[3 * n], data[3 * n + 1], data[3 * n + 2]];
        }
        Ok(())
    }
}
