//! Two-peer runs over `ThreadComm`, one thread per peer.

use grid_ghosts::prelude::*;

fn image_block(gid: u64, extent: [i64; 6], origin: [f64; 3]) -> GridBlock<ImageGrid> {
    let grid = ImageGrid::axis_aligned(Extent::new(extent), origin, [1.0, 1.0, 1.0]);
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
fn two_peers_exchange_descriptors_and_fields() {
    let assignment = PeerAssignment::new(2, [(Gid(0), 0), (Gid(1), 1)]);
    let comms = ThreadComm::channel(2);

    let mut workers = Vec::new();
    for (rank, comm) in comms.into_iter().enumerate() {
        let assignment = assignment.clone();
        workers.push(std::thread::spawn(move || {
            let inputs = if rank == 0 {
                vec![image_block(0, [0, 4, 0, 4, 0, 0], [0.0, 0.0, 0.0])]
            } else {
                vec![image_block(1, [0, 4, 0, 4, 0, 0], [4.0, 0.0, 0.0])]
            };
            generate_ghosts(inputs, &assignment, &comm, &GhostRequest::levels(1)).unwrap()
        }));
    }

    let outputs: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    let a = &outputs[0][0];
    let b = &outputs[1][0];

    assert_eq!(a.grid.extent, Extent::new([0, 5, 0, 4, 0, 0]));
    assert_eq!(b.grid.extent, Extent::new([-1, 4, 0, 4, 0, 0]));

    let a_owner = a.cell_data.by_name("owner").unwrap();
    let b_owner = b.cell_data.by_name("owner").unwrap();
    for j in 0..4 {
        let a_ghost = a.grid.extent.cell_id([4, j, 0]);
        assert_eq!(a.ghost_cells[a_ghost], DUPLICATE_CELL);
        assert_eq!(a_owner.tuple(a_ghost), &[1.0]);

        let b_ghost = b.grid.extent.cell_id([-1, j, 0]);
        assert_eq!(b.ghost_cells[b_ghost], DUPLICATE_CELL);
        assert_eq!(b_owner.tuple(b_ghost), &[0.0]);
    }
}

#[test]
fn three_peers_with_an_idle_middleman() {
    // Peer 1 owns nothing; it still takes part in both collective rounds.
    let assignment = PeerAssignment::new(3, [(Gid(0), 0), (Gid(1), 2)]);
    let comms = ThreadComm::channel(3);

    let mut workers = Vec::new();
    for (rank, comm) in comms.into_iter().enumerate() {
        let assignment = assignment.clone();
        workers.push(std::thread::spawn(move || {
            let inputs = match rank {
                0 => vec![image_block(0, [0, 4, 0, 4, 0, 0], [0.0, 0.0, 0.0])],
                2 => vec![image_block(1, [0, 4, 0, 4, 0, 0], [4.0, 0.0, 0.0])],
                _ => Vec::new(),
            };
            generate_ghosts(inputs, &assignment, &comm, &GhostRequest::levels(1)).unwrap()
        }));
    }

    let outputs: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    assert!(outputs[1].is_empty());
    assert_eq!(outputs[0][0].grid.extent, Extent::new([0, 5, 0, 4, 0, 0]));
    assert_eq!(outputs[2][0].grid.extent, Extent::new([-1, 4, 0, 4, 0, 0]));
}
