use birthmark_core::parser::{parse_listing, ListingParser};

const OBJDUMP: &str = "\
firmware.elf:     file format elf32-littlearm


Disassembly of section .text:

00008000 <main>:
    8000:\t2001      \tmovs\tr0, #1
    8002:\tf000 f801 \tbl\t8008 <helper>
    8006:\te7fb      \tb.n\t8000 <main>

00008008 <helper>:
    8008:\t4770      \tbx\tlr
";

#[test]
fn objdump_listing_yields_labelled_blocks() {
    let listing = parse_listing(OBJDUMP);

    assert_eq!(listing.blocks.len(), 2);
    let main = &listing.blocks[0];
    assert_eq!(main.section, ".text");
    assert_eq!(main.label.as_deref(), Some("main"));
    assert_eq!(main.block_index, 0);
    let mnemonics: Vec<&str> = main.instructions.iter().map(|i| i.mnemonic.as_str()).collect();
    assert_eq!(mnemonics, vec!["movs", "bl", "b"]);
    assert_eq!(main.instructions[0].operands, vec!["r0".to_string(), "#1".to_string()]);
    assert_eq!(main.instructions[1].address, Some(0x8002));
    assert_eq!(main.instructions[2].position_in_block, 2);

    let helper = &listing.blocks[1];
    assert_eq!(helper.label.as_deref(), Some("helper"));
    assert_eq!(helper.block_index, 1);
    assert_eq!(helper.instructions[0].mnemonic, "bx");

    assert_eq!(listing.stats.instructions, 4);
    assert_eq!(listing.stats.blocks, 2);
    assert_eq!(listing.stats.skipped_lines, 0);
}

#[test]
fn assembler_source_with_labels_and_comments() {
    let text = "\
    .syntax unified
    .text
main:
    MOVS r0, #0      @ counter
loop: adds r0, r0, #1 ; step
    cmp r0, #10      // limit
    bne loop
    bx lr
";
    let listing = parse_listing(text);

    assert_eq!(listing.blocks.len(), 2);
    assert_eq!(listing.blocks[0].label.as_deref(), Some("main"));
    assert_eq!(listing.blocks[0].instructions[0].mnemonic, "movs");
    assert_eq!(listing.blocks[0].instructions[0].operands, vec!["r0", "#0"]);

    let body = &listing.blocks[1];
    assert_eq!(body.label.as_deref(), Some("loop"));
    let mnemonics: Vec<&str> = body.instructions.iter().map(|i| i.mnemonic.as_str()).collect();
    assert_eq!(mnemonics, vec!["adds", "cmp", "bne", "bx"]);
    assert_eq!(body.instructions[1].operands, vec!["r0", "#10"]);
    assert!(body.instructions.iter().all(|i| i.address.is_none()));
}

#[test]
fn listing_without_code_section_is_empty() {
    let text = "main:\n    movs r0, #1\n    bx lr\n";
    let listing = parse_listing(text);
    assert!(listing.blocks.is_empty());
    assert_eq!(listing.instruction_count(), 0);
    assert_eq!(listing.stats.lines, 3);
}

#[test]
fn data_sections_are_ignored() {
    let text = "\
.data
table:
    movs r0, #1
.text
start:
    movs r1, #2
.section .rodata
    movs r2, #3
";
    let listing = parse_listing(text);
    assert_eq!(listing.blocks.len(), 1);
    assert_eq!(listing.blocks[0].label.as_deref(), Some("start"));
    assert_eq!(listing.stats.instructions, 1);
}

#[test]
fn section_directive_with_flags_is_recognized() {
    let text = ".section .text,\"ax\",%progbits\nentry:\n    nop\n";
    let listing = parse_listing(text);
    assert_eq!(listing.stats.instructions, 1);
    assert_eq!(listing.blocks[0].section, ".text");
}

#[test]
fn empty_blocks_do_not_consume_indices() {
    let text = "\
.text
first:
second:
    nop
third:
    nop
";
    let listing = parse_listing(text);
    let labels: Vec<_> = listing.blocks.iter().map(|b| b.label.as_deref()).collect();
    assert_eq!(labels, vec![Some("second"), Some("third")]);
    let indices: Vec<_> = listing.blocks.iter().map(|b| b.block_index).collect();
    assert_eq!(indices, vec![0, 1]);
}

#[test]
fn unrecognized_lines_are_counted_and_skipped() {
    let text = "\
.text
main:
    .align 2
    ...
    movs r0, #1
    12345 garbage
";
    let listing = parse_listing(text);
    assert_eq!(listing.stats.instructions, 1);
    assert_eq!(listing.stats.skipped_lines, 3);
}

#[test]
fn width_suffixes_are_stripped_from_mnemonics() {
    let text = ".text\nf:\n    BL.W target\n    ldr.n r0, [r1, #4]\n";
    let listing = parse_listing(text);
    let insns = &listing.blocks[0].instructions;
    assert_eq!(insns[0].mnemonic, "bl");
    assert_eq!(insns[1].mnemonic, "ldr");
    assert_eq!(insns[1].operands, vec!["r0", "[r1, #4]"]);
}

#[test]
fn instructions_before_any_label_form_an_unlabelled_block() {
    let listing = parse_listing(".text\n    nop\n    nop\nnext:\n    nop\n");
    assert_eq!(listing.blocks.len(), 2);
    assert_eq!(listing.blocks[0].label, None);
    assert_eq!(listing.blocks[0].len(), 2);
    assert_eq!(listing.blocks[1].block_index, 1);
}

#[test]
fn custom_code_sections_are_honoured() {
    let parser = ListingParser::new(vec![".text".to_string(), ".init".to_string()]);
    let text = ".init\n_init:\n    push {r3, lr}\n.text\nmain:\n    nop\n";
    let listing = parser.parse(text);

    assert_eq!(listing.blocks.len(), 2);
    assert_eq!(listing.blocks[0].section, ".init");
    assert_eq!(listing.blocks[0].instructions[0].operands, vec!["{r3, lr}"]);
    // Indices restart per section.
    assert_eq!(listing.blocks[0].block_index, 0);
    assert_eq!(listing.blocks[1].block_index, 0);

    assert!(parse_listing(text).blocks.iter().all(|b| b.section == ".text"));
}

#[test]
fn parsing_is_deterministic() {
    assert_eq!(parse_listing(OBJDUMP), parse_listing(OBJDUMP));
}

#[test]
fn empty_labels_carry_over_as_aliases() {
    let text = ".text\nmain:\n.LFB0:\n    push {r4, lr}\nlast:\n.data\n";
    let listing = parse_listing(text);
    assert_eq!(listing.blocks.len(), 1);
    let block = &listing.blocks[0];
    assert_eq!(block.label.as_deref(), Some(".LFB0"));
    assert_eq!(block.aliases, vec!["main"]);
    assert_eq!(block.labels().collect::<Vec<_>>(), vec!["main", ".LFB0"]);
    assert_eq!(block.block_index, 0);
}

#[test]
fn hex_named_labels_are_not_address_columns() {
    let text = ".text\nentry:\n    mov r0, r1\ncafe: add r0, r0, #1\ndead:\n    bx lr\n";
    let listing = parse_listing(text);
    let labels: Vec<_> = listing.blocks.iter().map(|b| b.label.as_deref()).collect();
    assert_eq!(labels, vec![Some("entry"), Some("cafe"), Some("dead")]);
    assert_eq!(listing.blocks[1].instructions[0].mnemonic, "add");
    assert_eq!(listing.blocks[1].instructions[0].address, None);

    // Columns separated by spaces still read as an address plus encoding.
    let objdump = ".text\nf:\n    8000:  2001  movs r0, #1\n";
    let listing = parse_listing(objdump);
    assert_eq!(listing.blocks.len(), 1);
    assert_eq!(listing.blocks[0].instructions[0].address, Some(0x8000));
}
