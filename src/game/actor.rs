use super::board::Cell;

/// One side of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Actor {
    PlayerOne,
    PlayerTwo,
}

impl Actor {
    /// Get the other side
    pub fn other(self) -> Actor {
        match self {
            Actor::PlayerOne => Actor::PlayerTwo,
            Actor::PlayerTwo => Actor::PlayerOne,
        }
    }

    /// Convert actor to the mark it leaves on the board
    pub fn to_cell(self) -> Cell {
        match self {
            Actor::PlayerOne => Cell::PlayerOne,
            Actor::PlayerTwo => Cell::PlayerTwo,
        }
    }

    /// Get actor name for display
    pub fn name(self) -> &'static str {
        match self {
            Actor::PlayerOne => "Player 1",
            Actor::PlayerTwo => "Player 2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_actor() {
        assert_eq!(Actor::PlayerOne.other(), Actor::PlayerTwo);
        assert_eq!(Actor::PlayerTwo.other(), Actor::PlayerOne);
    }

    #[test]
    fn test_cell_roundtrip() {
        for actor in [Actor::PlayerOne, Actor::PlayerTwo] {
            assert_eq!(actor.to_cell().actor(), Some(actor));
        }
        assert_eq!(Cell::Empty.actor(), None);
    }

    #[test]
    fn test_actor_name() {
        assert_eq!(Actor::PlayerOne.name(), "Player 1");
        assert_eq!(Actor::PlayerTwo.name(), "Player 2");
    }
}
