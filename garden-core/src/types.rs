use glam::IVec2;

/// Identifier for a plant in a [`crate::plant::PlantRegistry`].
///
/// Ids are handed out in increasing order by the registry and are never
/// reused within the lifetime of a given `Garden` instance.
pub type PlantId = u64;

/// Grid directions a growth tip can branch into.
///
/// The variant order is the order in which genes of a chromosome are read
/// and in which neighbours are visited during branching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grid offset of the neighbour in this direction. Rows grow downwards.
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }
}

/// Number of genes per chromosome: one per [`Direction`].
pub const CHROMOSOME_LENGTH: usize = Direction::ALL.len();
