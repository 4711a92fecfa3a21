use board::{Board, BoardConfig, Bridges, Tool, WidgetId};
use egui::{Color32, Pos2};
use image::RgbaImage;
use web_time::Instant;

// Helper to create a laid out board with a memory store and no host
fn create_test_board() -> Board {
    let mut board = Board::new(WidgetId::sanitize("history"), BoardConfig::default(), Bridges::default());
    board.layout(64.0, 32.0, 1.0);
    board
}

fn draw_stroke(board: &mut Board, from: Pos2, to: Pos2) {
    board.pointer_down(from);
    board.pointer_move(to);
    board.end_stroke(Instant::now());
}

fn pixels(board: &Board) -> RgbaImage {
    board.surface().pixels().clone()
}

fn is_blank(board: &Board) -> bool {
    board.surface().pixels().pixels().all(|p| p.0 == [255, 255, 255, 255])
}

#[test]
fn test_strokes_then_undos_restore_earlier_states() {
    let mut board = create_test_board();
    let mut states = vec![pixels(&board)];

    for i in 0..5 {
        let y = 4.0 + i as f32 * 5.0;
        draw_stroke(&mut board, Pos2::new(4.0, y), Pos2::new(60.0, y));
        states.push(pixels(&board));
    }

    for n in 1..=5 {
        assert!(board.undo(Instant::now()));
        assert_eq!(pixels(&board), states[5 - n], "after {n} undos");
    }
    assert!(!board.undo(Instant::now()));
}

#[test]
fn test_undo_then_redo_is_identity() {
    let mut board = create_test_board();
    draw_stroke(&mut board, Pos2::new(4.0, 4.0), Pos2::new(40.0, 20.0));
    let before = pixels(&board);

    assert!(board.undo(Instant::now()));
    assert_ne!(pixels(&board), before);
    assert!(board.redo(Instant::now()));
    assert_eq!(pixels(&board), before);
}

#[test]
fn test_new_stroke_or_clear_after_undo_drops_redo() {
    let mut board = create_test_board();
    draw_stroke(&mut board, Pos2::new(4.0, 4.0), Pos2::new(40.0, 4.0));
    board.undo(Instant::now());
    assert!(board.can_redo());

    draw_stroke(&mut board, Pos2::new(4.0, 10.0), Pos2::new(40.0, 10.0));
    assert!(!board.can_redo());
    assert!(!board.redo(Instant::now()));

    board.undo(Instant::now());
    assert!(board.can_redo());
    board.clear(Instant::now());
    assert!(!board.can_redo());
}

#[test]
fn test_history_is_bounded_to_forty() {
    let mut board = create_test_board();
    for i in 0..41 {
        let x = 1.0 + i as f32;
        draw_stroke(&mut board, Pos2::new(x, 2.0), Pos2::new(x, 30.0));
    }
    assert_eq!(board.history().undo_len(), 40);

    let mut undone = 0;
    while board.undo(Instant::now()) {
        undone += 1;
    }
    assert_eq!(undone, 40);
    // The blank state was evicted; the oldest kept frame has the first stroke
    assert!(!is_blank(&board));
}

#[test]
fn test_clear_fills_uniform_white_and_is_undoable() {
    let mut board = create_test_board();
    board.tools_mut().set_color(Color32::RED);
    draw_stroke(&mut board, Pos2::new(4.0, 4.0), Pos2::new(60.0, 28.0));
    let drawn = pixels(&board);

    board.clear(Instant::now());
    assert!(is_blank(&board));

    assert!(board.undo(Instant::now()));
    assert_eq!(pixels(&board), drawn);
}

#[test]
fn test_eraser_never_adds_color() {
    let mut board = create_test_board();
    board.tools_mut().set_color(Color32::BLUE);
    draw_stroke(&mut board, Pos2::new(4.0, 16.0), Pos2::new(60.0, 16.0));
    let before = pixels(&board);

    board.tools_mut().set_tool(Tool::Eraser);
    board.tools_mut().set_color(Color32::RED);
    draw_stroke(&mut board, Pos2::new(32.0, 0.0), Pos2::new(32.0, 31.0));
    let after = pixels(&board);

    for (b, a) in before.pixels().zip(after.pixels()) {
        assert_eq!(&a.0[..3], &b.0[..3]);
        assert!(a.0[3] <= b.0[3]);
    }
    assert!(before.pixels().zip(after.pixels()).any(|(b, a)| a.0[3] < b.0[3]));
}

#[test]
fn test_fresh_board_is_blank_and_undo_is_noop() {
    let mut board = create_test_board();
    assert!(is_blank(&board));
    assert!(!board.undo(Instant::now()));
    assert!(is_blank(&board));
    assert!(!board.persist_pending());
}

#[test]
fn test_stroke_clear_undo_shows_stroke() {
    let mut board = create_test_board();
    draw_stroke(&mut board, Pos2::new(4.0, 4.0), Pos2::new(60.0, 4.0));
    let stroke = pixels(&board);

    board.clear(Instant::now());
    board.undo(Instant::now());
    assert_eq!(pixels(&board), stroke);
}

#[test]
fn test_two_strokes_undo_undo_redo_shows_first() {
    let mut board = create_test_board();
    draw_stroke(&mut board, Pos2::new(4.0, 4.0), Pos2::new(60.0, 4.0));
    let stroke_a = pixels(&board);
    draw_stroke(&mut board, Pos2::new(4.0, 20.0), Pos2::new(60.0, 20.0));

    board.undo(Instant::now());
    board.undo(Instant::now());
    assert!(is_blank(&board));
    board.redo(Instant::now());
    assert_eq!(pixels(&board), stroke_a);
}

#[test]
fn test_single_click_leaves_a_dot() {
    let mut board = create_test_board();
    board.pointer_down(Pos2::new(20.0, 20.0));
    board.end_stroke(Instant::now());
    assert_ne!(board.surface().pixel(20, 20), Some([255, 255, 255, 255]));
}
