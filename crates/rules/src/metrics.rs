use fbf_core::Position;

/// Distance metric an ATTACK uses, keyed off the actor's *effective* attack
/// range rather than its class (SPEC_FULL.md §D.1 / Open Question 1):
/// melee (`range <= 1`) uses Manhattan, ranged (`range > 1`) uses Chebyshev.
pub fn attack_distance(effective_attack_range: i32, from: Position, to: Position) -> u32 {
    if effective_attack_range > 1 {
        from.chebyshev(to)
    } else {
        from.manhattan(to)
    }
}

/// Whether `from` and `to` lie on a common row, column, or diagonal, and if
/// so, the unit step between consecutive cells along that line. `None` when
/// no straight line connects them (the ranged-attack LOS check only applies
/// along a line; anything else has no "through" obstacle to speak of).
fn line_step(from: Position, to: Position) -> Option<(i8, i8)> {
    let dx = to.x as i8 - from.x as i8;
    let dy = to.y as i8 - from.y as i8;
    if dx == 0 && dy == 0 {
        return None;
    }
    if dx == 0 {
        Some((0, dy.signum()))
    } else if dy == 0 {
        Some((dx.signum(), 0))
    } else if dx.abs() == dy.abs() {
        Some((dx.signum(), dy.signum()))
    } else {
        None
    }
}

/// Every cell strictly between `from` and `to` along their shared line,
/// exclusive of both endpoints. Empty if they are adjacent or not aligned.
pub fn cells_between(from: Position, to: Position) -> Vec<Position> {
    let Some((sx, sy)) = line_step(from, to) else {
        return Vec::new();
    };
    let mut cells = Vec::new();
    let mut x = from.x as i8 + sx;
    let mut y = from.y as i8 + sy;
    while (x, y) != (to.x as i8, to.y as i8) {
        cells.push(Position::new(x as u8, y as u8));
        x += sx;
        y += sy;
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn melee_uses_manhattan() {
        let a = Position::new(2, 2);
        let b = Position::new(3, 3);
        assert_eq!(attack_distance(1, a, b), 2);
    }

    #[test]
    fn ranged_uses_chebyshev() {
        let a = Position::new(2, 2);
        let b = Position::new(3, 3);
        assert_eq!(attack_distance(3, a, b), 1);
    }

    #[test]
    fn cells_between_straight_line() {
        let a = Position::new(0, 2);
        let b = Position::new(3, 2);
        assert_eq!(
            cells_between(a, b),
            vec![Position::new(1, 2), Position::new(2, 2)]
        );
    }

    #[test]
    fn cells_between_unaligned_is_empty() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 1);
        assert!(cells_between(a, b).is_empty());
    }
}
