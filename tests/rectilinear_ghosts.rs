use grid_ghosts::prelude::*;

fn rect_block(gid: u64, x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> GridBlock<RectilinearGrid> {
    let extent = Extent::new([
        0,
        x.len() as i64 - 1,
        0,
        y.len() as i64 - 1,
        0,
        z.len() as i64 - 1,
    ]);
    let grid = RectilinearGrid {
        extent,
        x: CoordArray::F64(x),
        y: CoordArray::F64(y),
        z: CoordArray::F64(z),
    };
    let n_cells = grid.extent.num_cells();
    let mut block = GridBlock::new(Gid(gid), grid);
    block.cell_data = AttributeSet::new(vec![AttributeArray::new(
        "owner",
        1,
        vec![gid as f64; n_cells],
    )]);
    block
}

#[test]
fn neighbor_ticks_extend_each_axis_array() {
    // A with x ticks [0,1,2,3], B with [3,4,5], matching y and z.
    let inputs = vec![
        rect_block(0, vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0], vec![0.0]),
        rect_block(1, vec![3.0, 4.0, 5.0], vec![0.0, 1.0], vec![0.0]),
    ];
    let assignment = PeerAssignment::single_peer([Gid(0), Gid(1)]);
    let outputs = generate_ghosts(inputs, &assignment, &NoComm, &GhostRequest::levels(1)).unwrap();

    let a = &outputs[0];
    let b = &outputs[1];

    // A gains the single tick 4, B gains 2.
    assert_eq!(a.grid.extent, Extent::new([0, 4, 0, 1, 0, 0]));
    assert_eq!(a.grid.x, CoordArray::F64(vec![0.0, 1.0, 2.0, 3.0, 4.0]));
    assert_eq!(b.grid.extent, Extent::new([-1, 2, 0, 1, 0, 0]));
    assert_eq!(b.grid.x, CoordArray::F64(vec![2.0, 3.0, 4.0, 5.0]));
    assert_eq!(a.grid.y, CoordArray::F64(vec![0.0, 1.0]));

    // The ghost cells carry the neighbor's data.
    let a_ghost = a.grid.extent.cell_id([3, 0, 0]);
    assert_eq!(a.ghost_cells[a_ghost], DUPLICATE_CELL);
    assert_eq!(a.cell_data.by_name("owner").unwrap().tuple(a_ghost), &[1.0]);
    let b_ghost = b.grid.extent.cell_id([-1, 0, 0]);
    assert_eq!(b.ghost_cells[b_ghost], DUPLICATE_CELL);
    assert_eq!(b.cell_data.by_name("owner").unwrap().tuple(b_ghost), &[0.0]);
}

#[test]
fn one_ulp_apart_ticks_are_adjacent() {
    let t = 3.0_f64;
    let t_up = f64::from_bits(t.to_bits() + 1);
    let inputs = vec![
        rect_block(0, vec![0.0, 1.0, 2.0, t], vec![0.0, 1.0], vec![0.0]),
        rect_block(1, vec![t_up, 4.0, 5.0], vec![0.0, 1.0], vec![0.0]),
    ];
    let assignment = PeerAssignment::single_peer([Gid(0), Gid(1)]);
    let outputs = generate_ghosts(inputs, &assignment, &NoComm, &GhostRequest::levels(1)).unwrap();

    assert_eq!(outputs[0].grid.extent, Extent::new([0, 4, 0, 1, 0, 0]));
    assert_eq!(outputs[1].grid.extent, Extent::new([-1, 2, 0, 1, 0, 0]));
}

#[test]
fn mismatched_tick_density_is_not_adjacent() {
    // Same endpoints, different interior ticks: conservatively rejected.
    let inputs = vec![
        rect_block(0, vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0, 4.0], vec![0.0]),
        rect_block(1, vec![3.0, 4.0, 5.0], vec![0.0, 2.0, 4.0], vec![0.0]),
    ];
    let assignment = PeerAssignment::single_peer([Gid(0), Gid(1)]);
    let outputs = generate_ghosts(inputs, &assignment, &NoComm, &GhostRequest::levels(1)).unwrap();

    assert_eq!(outputs[0].grid.extent, Extent::new([0, 3, 0, 3, 0, 0]));
    assert!(outputs[0].ghost_cells.iter().all(|f| *f == 0));
}

#[test]
fn corner_contact_grows_both_axes() {
    // Blocks sharing only the tick (3, 3): corner contact in 2D.
    let inputs = vec![
        rect_block(0, vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0, 3.0], vec![0.0]),
        rect_block(1, vec![3.0, 4.0, 5.0], vec![3.0, 4.0, 5.0], vec![0.0]),
    ];
    let assignment = PeerAssignment::single_peer([Gid(0), Gid(1)]);
    let outputs = generate_ghosts(inputs, &assignment, &NoComm, &GhostRequest::levels(1)).unwrap();

    let a = &outputs[0];
    assert_eq!(a.grid.extent, Extent::new([0, 4, 0, 4, 0, 0]));
    assert_eq!(a.grid.x, CoordArray::F64(vec![0.0, 1.0, 2.0, 3.0, 4.0]));
    assert_eq!(a.grid.y, CoordArray::F64(vec![0.0, 1.0, 2.0, 3.0, 4.0]));

    // Only the corner cell has a donor; the rest of the new ring is
    // hidden.
    let corner = a.grid.extent.cell_id([3, 3, 0]);
    assert_eq!(a.ghost_cells[corner], DUPLICATE_CELL);
    assert_eq!(a.ghost_cells[a.grid.extent.cell_id([0, 3, 0])], HIDDEN_CELL);
    assert_eq!(a.ghost_cells[a.grid.extent.cell_id([3, 0, 0])], HIDDEN_CELL);
}
