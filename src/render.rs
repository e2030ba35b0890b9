use crate::assignment::Assignment;
use crate::grid_config::GridConfig;

/// Character used for block cells in rendered output.
pub const BLOCK: char = '█';

/// Project an assignment onto the grid: `Some(letter)` for filled cells, `None` for blocks and for
/// letter cells whose slots aren't filled. Words for slots that aren't in `config` are ignored.
pub fn letter_grid(config: &GridConfig, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; config.width]; config.height];

    for (key, word) in assignment.iter() {
        let Some(slot_id) = config.slot_id(key) else {
            continue;
        };
        let cells = &config.slot_configs[slot_id].cells;
        for (&(row, column), letter) in cells.iter().zip(word.chars()) {
            letters[row][column] = Some(letter);
        }
    }

    letters
}

/// Turn the given grid config and assignment into a rendered string, one line per row.
pub fn render_grid(config: &GridConfig, assignment: &Assignment) -> String {
    letter_grid(config, assignment)
        .iter()
        .enumerate()
        .map(|(row, letters)| {
            letters
                .iter()
                .enumerate()
                .map(|(column, letter)| {
                    if config.is_letter_cell((row, column)) {
                        letter.unwrap_or(' ')
                    } else {
                        BLOCK
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::assignment::Assignment;
    use crate::grid_config::{Direction, SlotKey};
    use crate::parse::parse_structure;
    use crate::render::{letter_grid, render_grid};

    #[test]
    fn test_render_grid() {
        let config = parse_structure("___\n_##\n_##").unwrap();
        let mut assignment = Assignment::new();
        assignment.insert(SlotKey::new(0, 0, Direction::Across), "CAT");
        assignment.insert(SlotKey::new(0, 0, Direction::Down), "COW");

        assert_eq!(render_grid(&config, &assignment), "CAT\nO██\nW██");
    }

    #[test]
    fn test_unfilled_cells_are_blank() {
        let config = parse_structure("___\n_##\n_##").unwrap();
        let mut assignment = Assignment::new();
        assignment.insert(SlotKey::new(0, 0, Direction::Across), "CAT");

        assert_eq!(letter_grid(&config, &assignment)[1][0], None);
        assert_eq!(render_grid(&config, &assignment), "CAT\n ██\n ██");
    }
}
