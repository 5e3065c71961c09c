use crate::display::DisplaySetting;
use station_types::{BoxId, DisplayCommand};

pub const COMMAND_PREFIX: &str = "#BLOCK:";

pub fn build_command(box_id: BoxId, setting: &DisplaySetting, style: u8) -> DisplayCommand {
    DisplayCommand {
        box_id,
        style,
        color: setting.color(),
        rows: setting.encoded_rows(),
    }
}

/// `#BLOCK:<box>,<style>,<r>,<g>,<b>,<row0>,...,<row7>\n`
pub fn encode_command(command: &DisplayCommand) -> String {
    let mut fields = vec![
        command.box_id.to_string(),
        command.style.to_string(),
        command.color.r.to_string(),
        command.color.g.to_string(),
        command.color.b.to_string(),
    ];
    fields.extend(command.rows.iter().map(|row| row.to_string()));

    format!("{}{}\n", COMMAND_PREFIX, fields.join(","))
}

pub fn encode(box_id: BoxId, setting: &DisplaySetting, style: u8) -> String {
    encode_command(&build_command(box_id, setting, style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{BitGrid, DisplaySettingTable};
    use station_types::{DisplayKey, Rgb};

    #[test]
    fn test_encode_default_mark() {
        let table = DisplaySettingTable::new();
        let line = encode(3, table.get(DisplayKey::Mark), 5);
        assert_eq!(line, "#BLOCK:3,5,200,150,35,24,24,24,255,255,24,24,24\n");
    }

    #[test]
    fn test_encode_uses_current_grid() {
        let mut setting = DisplaySetting::new(Rgb::new(1, 2, 3), BitGrid::default());
        assert_eq!(encode(12, &setting, 3), "#BLOCK:12,3,1,2,3,0,0,0,0,0,0,0,0\n");

        setting.toggle_cell(7, 0).unwrap();
        assert_eq!(encode(12, &setting, 3), "#BLOCK:12,3,1,2,3,0,0,0,0,0,0,0,128\n");
    }

    #[test]
    fn test_encoded_rows_decode_to_grid() {
        let grid = BitGrid::from_bits([
            [1, 0, 0, 0, 0, 0, 0, 1],
            [0, 1, 0, 0, 0, 0, 1, 0],
            [0, 0, 1, 0, 0, 1, 0, 0],
            [0, 0, 0, 1, 1, 0, 0, 0],
            [0, 0, 0, 1, 1, 0, 0, 0],
            [0, 0, 1, 0, 0, 1, 0, 0],
            [0, 1, 0, 0, 0, 0, 1, 0],
            [1, 0, 0, 0, 0, 0, 0, 1],
        ]);
        let setting = DisplaySetting::new(Rgb::new(0, 255, 0), grid);
        let line = encode(1, &setting, 5);

        let fields: Vec<u8> = line
            .trim_end()
            .trim_start_matches(COMMAND_PREFIX)
            .split(',')
            .map(|f| f.parse().unwrap())
            .collect();
        assert_eq!(fields.len(), 13);

        let rows: [u8; 8] = fields[5..].try_into().unwrap();
        assert_eq!(BitGrid::from_rows(rows), grid);
    }
}
